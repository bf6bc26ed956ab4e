pub mod project;
pub mod session;
pub mod task;
pub mod user;

pub use project::{AddMemberRequest, NewProject, Project};
pub use session::{Session, VerificationCode};
pub use task::{NewTask, Task};
pub use user::User;
