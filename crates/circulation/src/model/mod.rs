pub mod copy;
pub mod fine;
pub mod id;
pub mod issue;
pub mod reader;
pub mod reservation;
pub mod title;

pub use copy::{BookCopy, CopyStatus};
pub use fine::Fine;
pub use id::{CopyId, FineId, IssueId, ReaderId, ReservationId, StaffId, TitleId};
pub use issue::Issue;
pub use reader::Reader;
pub use reservation::{Reservation, ReservationStatus};
pub use title::Title;
