//! Signal building blocks for the formant engine.

use std::f32::consts::PI;

/// Naive sawtooth in `[-1, 1)`. Phase carries over between phonemes.
#[derive(Debug, Clone, Default)]
pub struct Sawtooth {
    phase: f32,
}

impl Sawtooth {
    pub fn next(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = 2.0 * self.phase - 1.0;
        self.phase = (self.phase + frequency / sample_rate).fract();
        value
    }
}

/// Direct form I biquad with RBJ cookbook coefficients.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Band-pass with 0 dB peak gain at `center`.
    pub fn band_pass(center: f32, q: f32, sample_rate: f32) -> Self {
        let (cos, alpha) = Self::prewarp(center, q, sample_rate);
        Self::normalized(alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
    }

    pub fn high_pass(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let (cos, alpha) = Self::prewarp(cutoff, q, sample_rate);
        let b = (1.0 + cos) / 2.0;
        Self::normalized(b, -(1.0 + cos), b, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
    }

    fn prewarp(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
        // Keep the corner strictly inside (0, Nyquist).
        let frequency = frequency.clamp(20.0, sample_rate * 0.45);
        let w0 = 2.0 * PI * frequency / sample_rate;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Linear attack to `peak`, then exponential decay to `floor` at the end.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub peak: f32,
    pub attack: f32,
    pub floor: f32,
}

impl Envelope {
    /// Gain at `t` seconds into a segment of `duration` seconds.
    pub fn gain(&self, t: f32, duration: f32) -> f32 {
        if t < self.attack || duration <= self.attack {
            return self.peak * (t / self.attack).min(1.0);
        }
        let progress = ((t - self.attack) / (duration - self.attack)).min(1.0);
        self.peak * (self.floor / self.peak).powf(progress)
    }
}
