const MIN_SIZE: f64 = 0.2;
const SHRINK_PER_STEP: f64 = 0.05;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub hue: f64,
}

impl Particle {
    fn spawn(width: f64, height: f64, random: &mut impl FnMut() -> f64) -> Self {
        Self {
            x: random() * width,
            y: random() * height,
            size: random() * 3.0 + 1.0,
            speed_x: random() * 2.0 - 1.0,
            speed_y: random() * 2.0 - 1.0,
            hue: random() * 360.0,
        }
    }

    pub fn color(&self) -> String {
        format!("hsl({:.0}, 50%, 50%)", self.hue)
    }
}

/// Decorative drifting dots behind the page. `random` must yield samples in
/// `[0, 1)`; the browser passes `Math.random`.
pub struct ParticleField {
    width: f64,
    height: f64,
    count: usize,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(count: usize, width: f64, height: f64, random: &mut impl FnMut() -> f64) -> Self {
        let mut field = Self {
            width,
            height,
            count,
            particles: Vec::with_capacity(count),
        };
        field.resize(width, height, random);
        field
    }

    pub fn resize(&mut self, width: f64, height: f64, random: &mut impl FnMut() -> f64) {
        self.width = width;
        self.height = height;
        self.particles = (0..self.count)
            .map(|_| Particle::spawn(width, height, random))
            .collect();
    }

    pub fn step(&mut self, random: &mut impl FnMut() -> f64) {
        let (width, height) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.x += particle.speed_x;
            particle.y += particle.speed_y;
            if particle.size > MIN_SIZE {
                particle.size -= SHRINK_PER_STEP;
            }
            if particle.x < 0.0 || particle.x > width {
                particle.speed_x = -particle.speed_x;
            }
            if particle.y < 0.0 || particle.y > height {
                particle.speed_y = -particle.speed_y;
            }
            if particle.size <= MIN_SIZE {
                *particle = Particle::spawn(width, height, random);
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
