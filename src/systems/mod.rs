mod ai_traffic;
mod bookkeeping;
mod calendar;
mod flight_ops;

pub use ai_traffic::AiTrafficSystem;
pub use bookkeeping::BookkeepingSystem;
pub use calendar::CalendarSystem;
pub use flight_ops::FlightOpsSystem;
