#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterializeOptions {
    max_concurrent: usize,
}

impl Default for MaterializeOptions {
    fn default() -> Self { Self::new() }
}

impl MaterializeOptions {
    pub const DEFAULT_MAX_CONCURRENT: usize = 64;

    pub fn new() -> Self {
        Self {
            max_concurrent: Self::DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Upper bound on content groups in flight at once. `0` is treated as `1`.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn get_max_concurrent(&self) -> usize { self.max_concurrent }
}
