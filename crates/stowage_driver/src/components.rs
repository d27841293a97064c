//! Component types used by the workload.

use rand::Rng;

/// Three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct V3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl V3 {
    /// Creates a vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The vector the workload attaches to the entity with 1-based index `i`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_index(i: u32) -> Self {
        let t = i as f32 / 1_000_000.0;
        Self::new(t.sin(), t.cos(), t)
    }

    /// Sum of the components.
    #[must_use]
    pub fn sum(self) -> f32 {
        self.x + self.y + self.z
    }
}

impl std::ops::Add for V3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for V3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Payload of twenty integers, attached to a subset of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestData(pub [i32; 20]);

impl TestData {
    /// Fills every slot with a value in `0..bound`.
    ///
    /// `bound` must be positive.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R, bound: i32) -> Self {
        let mut data = [0; 20];
        for slot in &mut data {
            *slot = rng.gen_range(0..bound);
        }
        Self(data)
    }
}
