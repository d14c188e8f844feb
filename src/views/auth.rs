//! Login and registration.

use super::forms::{self, Form};
use super::{OrFail, Screen, ViewError};
use crate::api::models::{LoginRequest, RegisterRequest};
use crate::api::{ApiClient, ApiError};
use crate::session::{Role, SharedSession, User};

const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";
const REGISTER_ROLES: &[&str] = &["ROLE_EMPLOYEE", "ROLE_RECRUITER"];

/// A successful login. `warning` is set when the session could not be
/// persisted and will not survive a restart.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub warning: Option<String>,
}

pub fn render_login() -> String {
    let mut screen = Screen::new("Welcome Back");
    screen
        .line("Sign in to your account.")
        .blank()
        .line("  /login <email> [password]")
        .blank()
        .line("Don't have an account? /register name=... email=... password=... [role=ROLE_EMPLOYEE|ROLE_RECRUITER]");
    screen.finish()
}

pub fn render_register() -> String {
    let mut screen = Screen::new("Create an Account");
    screen
        .line("  /register name=<name> email=<email> password=<password> [role=ROLE_EMPLOYEE|ROLE_RECRUITER]")
        .blank()
        .line("Already registered? /login <email>");
    screen.finish()
}

/// Authenticate and establish the session
pub fn login(
    client: &ApiClient,
    session: &SharedSession,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, ViewError> {
    let email = forms::email(email)?;
    let password = forms::require("password", password)?;

    let response = match client.auth().login(&LoginRequest {
        email: email.clone(),
        password,
    }) {
        Ok(r) => r,
        // A 401 here means bad credentials, not an expired session.
        Err(ApiError::Unauthorized) => return Err(ViewError::Refused(INVALID_CREDENTIALS.to_string())),
        Err(source) => {
            return Err(ViewError::Api {
                source,
                fallback: INVALID_CREDENTIALS,
            })
        }
    };
    if response.token.trim().is_empty() {
        return Err(ViewError::Refused(
            "Login response did not include a token".to_string(),
        ));
    }

    let user = User {
        id: response.user_id,
        name: response.user_name,
        email,
        role: Role::parse(&response.user_role),
    };
    let warning = session
        .borrow_mut()
        .login(user.clone(), &response.token)
        .err()
        .map(|e| format!("Session will not be remembered: {}", e));
    Ok(LoginOutcome { user, warning })
}

pub fn register(client: &ApiClient, form: &Form) -> Result<String, ViewError> {
    form.only(&["name", "email", "password", "role"])?;
    let request = RegisterRequest {
        name: form.required("name")?,
        email: forms::email(form.get("email").unwrap_or(""))?,
        password: form.required("password")?,
        role: forms::one_of("role", &form.or("role", "ROLE_EMPLOYEE"), REGISTER_ROLES)?,
    };
    client
        .auth()
        .register(&request)
        .or_fail("Registration failed. Please try again.")?;
    Ok(format!(
        "Registered {}. You can now /login {}",
        request.email, request.email
    ))
}
