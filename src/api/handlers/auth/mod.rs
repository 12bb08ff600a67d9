//! Auth handlers: the sign-in/sign-up page, form submission, OAuth hand-off
//! and sign-out.

mod oauth;
mod page;
mod password;
mod session;
pub mod state;
pub mod types;

pub use self::oauth::{__path_oauth, oauth};
pub use self::page::{__path_page, PageQuery, page};
pub use self::password::{__path_sign_in, __path_sign_up, sign_in, sign_up};
pub use self::session::{__path_sign_out, sign_out};
pub use self::state::{AuthConfig, AuthState};

pub const PAGE_PATH: &str = "/auth";
pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const SIGN_UP_PATH: &str = "/auth/signup";
pub const SIGN_OUT_PATH: &str = "/auth/signout";
/// Prefix of the provider hand-off routes, `/auth/oauth/{provider}`.
pub const OAUTH_PATH: &str = "/auth/oauth";
