pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use claims::{Claims, RefreshClaims};
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use policy::{is_admin, is_student, require_admin, require_owner, require_student};
