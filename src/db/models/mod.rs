pub mod role;
pub mod state;
pub mod task;
pub mod todo;
pub mod user;

pub use role::{Role, ADMIN_ROLE};
pub use state::State;
pub use task::{Priority, Task, TaskDto};
pub use todo::{NewTodo, Todo, TodoAccess};
pub use user::{NewUser, User, UserUpdate};
