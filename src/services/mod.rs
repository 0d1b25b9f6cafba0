pub mod roles;
pub mod states;
pub mod tasks;
pub mod todos;
pub mod users;

pub use roles::RoleRegistry;
pub use states::StateRegistry;
pub use tasks::TaskService;
pub use todos::TodoService;
pub use users::UserDirectory;
