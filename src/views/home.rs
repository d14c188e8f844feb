use super::Screen;
use crate::guard::Route;
use crate::session::Session;

pub fn render(session: &Session) -> String {
    let mut screen = Screen::new("Find Your Dream Job");
    screen.line("Connect with top employers and explore thousands of opportunities.");
    screen.blank();
    match session.user() {
        Some(user) => {
            let landing = Route::landing_for(&user.role);
            if landing == Route::Home {
                screen.line("Your account has no dashboard. Try /profile.");
            } else {
                screen.line(&format!("Go to your dashboard: /open {}", landing));
            }
        }
        None => {
            screen
                .line("Get started: /register")
                .line("Sign in:     /login <email>");
        }
    }
    screen
        .section("For Job Seekers")
        .line("Browse jobs and apply with ease. Track your applications in real time.")
        .section("For Recruiters")
        .line("Post jobs, review applications, and find the right candidates.")
        .section("For Administrators")
        .line("Watch platform statistics and manage the course catalogue.");
    screen.finish()
}

pub fn render_access_denied() -> String {
    let mut screen = Screen::new("Access Denied");
    screen.line("You don't have permission to access this page.");
    screen.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, User};

    #[test]
    fn test_home_points_to_dashboard() {
        let session = Session::authenticated(
            User {
                id: 1,
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                role: Role::Employee,
            },
            "t",
        );
        assert!(render(&session).contains("/open /employee/dashboard"));
        assert!(render(&Session::empty()).contains("/login"));
    }
}
