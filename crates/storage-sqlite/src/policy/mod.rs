mod repository;

pub use repository::PolicyRateRepository;
