mod spot;

pub use spot::Spot;
