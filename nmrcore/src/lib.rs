// data module
pub mod data {
    pub mod association;
    pub mod spectrum;
}

// algorithm module
pub mod algorithm {
    pub mod compress;
    pub mod merge;
    pub mod multiplet;
    pub mod synthesize;
}
