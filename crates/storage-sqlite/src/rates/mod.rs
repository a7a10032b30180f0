mod repository;

pub use repository::RateRepository;
