pub mod event;
pub mod reservation;
pub mod ticket;
pub mod user;

pub use event::Event;
pub use reservation::{
    CreateReservationRequest, NewReservation, ReservationDetails, ReservationReceipt,
    ReservationStatus, ReservationSummary, TicketRequest,
};
pub use ticket::{NewTicket, TicketStatus, TicketType, TicketView};
pub use user::{Principal, Role};
