pub mod roles;
pub mod states;
pub mod tasks;
pub mod todos;
pub mod users;

pub use roles::RoleRepository;
pub use states::StateRepository;
pub use tasks::TaskRepository;
pub use todos::TodoRepository;
pub use users::UserRepository;
