use crate::api::{ApiClient, ApiError};
use crate::config::{Config, CONFIG_DIR};
use crate::guard::{self, Access, Decision, Route};
use crate::journal::SharedJournal;
use crate::session::{Role, SharedSession, User};
use crate::views::admin::{self, AdminDashboard};
use crate::views::employee::{self, EmployeeDashboard, SearchBy};
use crate::views::forms::Form;
use crate::views::profile::{self, Profile, ProfileDraft, Upload};
use crate::views::recruiter::{self, RecruiterDashboard, Verdict};
use crate::views::subscriptions::{self, Listing, SubscriptionList};
use crate::views::{auth, home, notifications, OrFail, ViewError};
use crate::Args;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LOAD_FAILED: &str = "Error fetching data";
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const EMAIL_ROLES: &[Role] = &[Role::Admin, Role::Recruiter];

const HELP: &str = "\
Navigation:
  /home                     - landing page
  /dashboard                - your role's dashboard
  /open <path>              - open a view, e.g. /open /admin/dashboard
  /profile                  - your profile
  /subscriptions [mine|all|employee <id>|recruiter <id>]
  /whoami                   - show the current session
Account:
  /login <email> [password]
  /register name=... email=... password=... [role=ROLE_EMPLOYEE|ROLE_RECRUITER]
  /logout
Job seekers:
  /jobs [term]              - filter the job list by title, company or location
  /search <company|title|location> <term>
  /apply <job id>
Recruiters:
  /post-job jobTitle=... companyName=... jobLocation=... jobDescription=... deadLineDate=YYYY-MM-DD
  /applicants <job id>
  /shortlist <application id>
  /reject <application id>
Administrators:
  /add-course courseTitle=... courseDescription=... courseCatogory=...
  /deactivate-course <course id>
Profile:
  /edit key=value ...
  /upload-resume <file>
  /upload-image <file>
Subscriptions and mail:
  /subscribe key=value ...
  /invoice <subscription id> <output file>
  /email <to> <subject> <body>
  /exit                     - quit";

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub session: SharedSession,
    pub client: ApiClient,
    pub journal: SharedJournal,
    pub route: RefCell<Route>,
    pub search: RefCell<String>,
    pub draft: RefCell<ProfileDraft>,
}

impl Context {
    pub fn new(
        args: Args,
        config: Config,
        session: SharedSession,
        client: ApiClient,
        journal: SharedJournal,
    ) -> Self {
        Self {
            args,
            config,
            session,
            client,
            journal,
            route: RefCell::new(Route::Home),
            search: RefCell::new(String::new()),
            draft: RefCell::new(ProfileDraft::default()),
        }
    }

    fn user(&self) -> Option<User> {
        self.session.borrow().session().user().cloned()
    }

    /// Status line shown as the REPL prompt
    pub fn prompt(&self) -> String {
        let route = *self.route.borrow();
        match self.user() {
            Some(user) => format!("Welcome, {} {}> ", user.name, route),
            None => format!("(/login or /register) {}> ", route),
        }
    }

    fn interactive(&self) -> bool {
        self.args.command.is_none()
    }
}

/// What a command produced
enum Reply {
    Show(String),
    Exit,
}

/// How handling one line ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Failed,
    Exit,
}

pub fn run_once(ctx: &Context, line: &str) -> Result<()> {
    match handle_command(ctx, line) {
        Outcome::Failed => anyhow::bail!("command did not complete"),
        Outcome::Continue | Outcome::Exit => Ok(()),
    }
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = rl.load_history(path);
    }

    println!("jobdesk - type /help for commands, /exit to quit");
    let start = match ctx.user() {
        Some(user) => Route::landing_for(&user.role),
        None => Route::Home,
    };
    handle_command(&ctx, &format!("/open {}", start.path()));

    loop {
        match rl.readline(&ctx.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                // Keep passwords out of the history file.
                if !line.starts_with("/login") {
                    rl.add_history_entry(line)?;
                }

                if !line.starts_with('/') {
                    println!("Commands start with '/'. Type /help for the list.");
                    continue;
                }
                if handle_command(&ctx, line) == Outcome::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            debug!(error = %e, "could not save history");
        }
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(CONFIG_DIR);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("history.txt"))
}

pub fn handle_command(ctx: &Context, line: &str) -> Outcome {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Outcome::Failed;
        }
    };
    match dispatch(ctx, &words) {
        Ok(Reply::Exit) => Outcome::Exit,
        Ok(Reply::Show(text)) => {
            if !text.is_empty() {
                println!("{}", text.trim_end());
            }
            Outcome::Continue
        }
        Err(e) => {
            report(ctx, &e);
            Outcome::Failed
        }
    }
}

/// Show a failure. A rejected credential sends the user back to login no
/// matter which command triggered it.
fn report(ctx: &Context, err: &ViewError) {
    if err.is_unauthorized() {
        signed_out(ctx);
        println!("{}", err);
        println!("{}", auth::render_login().trim_end());
    } else {
        eprintln!("Error: {}", err);
    }
}

fn dispatch(ctx: &Context, words: &[String]) -> Result<Reply, ViewError> {
    let Some((cmd, args)) = words.split_first() else {
        return Ok(Reply::Show(String::new()));
    };
    match cmd.as_str() {
        "/exit" | "/quit" => Ok(Reply::Exit),
        "/help" => Ok(Reply::Show(HELP.to_string())),
        "/whoami" => Ok(Reply::Show(whoami(ctx))),
        "/open" => {
            let path = arg(args, 0, "Usage: /open <path>")?;
            navigate(ctx, Route::parse(path))
        }
        "/home" => navigate(ctx, Route::Home),
        "/dashboard" => {
            let route = match ctx.user() {
                Some(user) => Route::landing_for(&user.role),
                None => Route::Login,
            };
            navigate(ctx, route)
        }
        "/profile" => navigate(ctx, Route::Profile),

        "/login" => login(ctx, args),
        "/register" => {
            let form = Form::parse(args)?;
            let message = auth::register(&ctx.client, &form)?;
            Ok(with_message(message, navigate(ctx, Route::Login)?))
        }
        "/logout" => logout(ctx),

        "/jobs" => {
            *ctx.search.borrow_mut() = args.join(" ");
            navigate(ctx, Route::EmployeeDashboard)
        }
        "/search" => {
            let usage = "Usage: /search <company|title|location> <term>";
            let by = SearchBy::parse(arg(args, 0, usage)?)
                .ok_or_else(|| ViewError::Refused(usage.to_string()))?;
            let term = args[1..].join(" ");
            within(ctx, Route::EmployeeDashboard, |_| {
                employee::search(&ctx.client, by, &term)
            })
        }
        "/apply" => {
            let id = arg(args, 0, "Usage: /apply <job id>")?;
            act(ctx, Route::EmployeeDashboard, |user| {
                employee::apply(&ctx.client, user, id)
            })
        }

        "/post-job" => {
            let form = Form::parse(args)?;
            act(ctx, Route::RecruiterDashboard, |user| {
                recruiter::post_job(&ctx.client, user, &form)
            })
        }
        "/applicants" => {
            let id = arg(args, 0, "Usage: /applicants <job id>")?;
            within(ctx, Route::RecruiterDashboard, |user| {
                recruiter::applicants(&ctx.client, user, id)
            })
        }
        "/shortlist" | "/reject" => {
            let verdict = if cmd == "/shortlist" {
                Verdict::Shortlist
            } else {
                Verdict::Reject
            };
            let id = arg(args, 0, "Usage: /shortlist|/reject <application id>")?;
            act(ctx, Route::RecruiterDashboard, |user| {
                recruiter::update_status(&ctx.client, user, id, verdict)
            })
        }

        "/add-course" => {
            let form = Form::parse(args)?;
            act(ctx, Route::AdminDashboard, |user| {
                admin::add_course(&ctx.client, user, &form)
            })
        }
        "/deactivate-course" => {
            let id = arg(args, 0, "Usage: /deactivate-course <course id>")?;
            act(ctx, Route::AdminDashboard, |_| {
                let course = admin::find_active_course(&ctx.client, id)?;
                let question = format!(
                    "Deactivate course #{} ({})?",
                    id,
                    course.course_title.as_deref().unwrap_or("untitled")
                );
                if !confirm(ctx, &question) {
                    return Err(ViewError::Refused("Deactivation cancelled".to_string()));
                }
                admin::deactivate_course(&ctx.client, &course)
            })
        }

        "/edit" => {
            let form = Form::parse(args)?;
            act(ctx, Route::Profile, |user| {
                let message = profile::save(&ctx.client, user, &form, &ctx.draft.borrow())?;
                *ctx.draft.borrow_mut() = ProfileDraft::default();
                Ok(message)
            })
        }
        "/upload-resume" | "/upload-image" => {
            let kind = if cmd == "/upload-resume" {
                Upload::Resume
            } else {
                Upload::Image
            };
            let file = arg(args, 0, "Usage: /upload-resume|/upload-image <file>")?;
            act(ctx, Route::Profile, |user| {
                if kind == Upload::Resume && user.role != Role::Employee {
                    return Err(ViewError::Refused(
                        "Only job seekers have a resume".to_string(),
                    ));
                }
                profile::upload(&ctx.client, kind, Path::new(file), &mut ctx.draft.borrow_mut())
            })
        }

        "/subscriptions" => {
            let listing = Listing::parse(args)?;
            let required = if listing == Listing::Mine {
                required_roles(Route::Subscriptions)
            } else {
                ADMIN_ONLY
            };
            let user = match admit(ctx, Route::Subscriptions.path(), required) {
                Ok(user) => user,
                Err(reply) => return Ok(reply),
            };
            *ctx.route.borrow_mut() = Route::Subscriptions;
            let list = SubscriptionList::load(&ctx.client, &user, listing).or_fail(LOAD_FAILED)?;
            Ok(Reply::Show(list.render()))
        }
        "/subscribe" => {
            let form = Form::parse(args)?;
            act(ctx, Route::Subscriptions, |_| {
                subscriptions::create(&ctx.client, &form)
            })
        }
        "/invoice" => {
            let usage = "Usage: /invoice <subscription id> <output file>";
            let id = arg(args, 0, usage)?;
            let out = arg(args, 1, usage)?;
            within(ctx, Route::Subscriptions, |_| {
                subscriptions::invoice(&ctx.client, id, Path::new(out))
            })
        }

        "/email" => {
            let usage = "Usage: /email <to> <subject> <body>";
            let to = arg(args, 0, usage)?;
            let subject = arg(args, 1, usage)?;
            let body = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
            if let Err(reply) = admit(ctx, "/email", EMAIL_ROLES) {
                return Ok(reply);
            }
            Ok(Reply::Show(notifications::send_email(
                &ctx.client,
                to,
                subject,
                &body,
            )?))
        }

        other => Err(ViewError::Refused(format!(
            "Unknown command: {}. Type /help for the list.",
            other
        ))),
    }
}

fn arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str, ViewError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ViewError::Refused(usage.to_string()))
}

fn with_message(message: String, reply: Reply) -> Reply {
    match reply {
        Reply::Show(view) => Reply::Show(format!("{}\n\n{}", message, view)),
        Reply::Exit => Reply::Exit,
    }
}

fn required_roles(route: Route) -> &'static [Role] {
    match route.access() {
        Access::Protected(roles) => roles,
        Access::Public => &[],
    }
}

/// Guard an action that is not itself a route. A refusal becomes the login
/// or access-denied view.
fn admit(ctx: &Context, requested: &str, required: &[Role]) -> Result<User, Reply> {
    let decision = guard::evaluate(ctx.session.borrow().session(), required);
    match (decision, ctx.user()) {
        (Decision::Render, Some(user)) => Ok(user),
        (Decision::AccessDenied, _) => Err(turn_away(ctx, requested, Decision::AccessDenied)),
        _ => Err(turn_away(ctx, requested, Decision::RedirectToLogin)),
    }
}

fn turn_away(ctx: &Context, requested: &str, decision: Decision) -> Reply {
    let shown = match decision {
        Decision::AccessDenied => Route::AccessDenied,
        _ => Route::Login,
    };
    ctx.journal
        .borrow_mut()
        .navigation(requested, shown.path(), decision.as_str());
    debug!(requested, shown = shown.path(), decision = decision.as_str(), "navigation refused");
    *ctx.route.borrow_mut() = shown;
    Reply::Show(match shown {
        Route::AccessDenied => home::render_access_denied(),
        _ => format!("Please log in to continue.\n\n{}", auth::render_login()),
    })
}

fn navigate(ctx: &Context, requested: Route) -> Result<Reply, ViewError> {
    let (shown, decision) = guard::resolve(ctx.session.borrow().session(), requested);
    if decision != Decision::Render {
        return Ok(turn_away(ctx, requested.path(), decision));
    }
    ctx.journal
        .borrow_mut()
        .navigation(requested.path(), shown.path(), decision.as_str());
    *ctx.route.borrow_mut() = shown;
    Ok(Reply::Show(render(ctx, shown)?))
}

/// Run an action that belongs to `route`, then show the refreshed view
fn act<F>(ctx: &Context, route: Route, action: F) -> Result<Reply, ViewError>
where
    F: FnOnce(&User) -> Result<String, ViewError>,
{
    let user = match admit(ctx, route.path(), required_roles(route)) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };
    let message = action(&user)?;
    Ok(with_message(message, navigate(ctx, route)?))
}

/// Like `act`, for actions whose output replaces the view
fn within<F>(ctx: &Context, route: Route, action: F) -> Result<Reply, ViewError>
where
    F: FnOnce(&User) -> Result<String, ViewError>,
{
    match admit(ctx, route.path(), required_roles(route)) {
        Ok(user) => Ok(Reply::Show(action(&user)?)),
        Err(reply) => Ok(reply),
    }
}

fn current_user(ctx: &Context) -> Result<User, ViewError> {
    ctx.user().ok_or(ViewError::Api {
        source: ApiError::Unauthorized,
        fallback: LOAD_FAILED,
    })
}

fn render(ctx: &Context, route: Route) -> Result<String, ViewError> {
    match route {
        Route::Home => Ok(home::render(ctx.session.borrow().session())),
        Route::Login => Ok(auth::render_login()),
        Route::Register => Ok(auth::render_register()),
        Route::AccessDenied => Ok(home::render_access_denied()),
        Route::EmployeeDashboard => {
            let user = current_user(ctx)?;
            let dashboard = EmployeeDashboard::load(&ctx.client, &user).or_fail(LOAD_FAILED)?;
            Ok(dashboard.render(&user, &ctx.search.borrow()))
        }
        Route::RecruiterDashboard => {
            let user = current_user(ctx)?;
            let dashboard = RecruiterDashboard::load(&ctx.client, &user).or_fail(LOAD_FAILED)?;
            Ok(dashboard.render(&user))
        }
        Route::AdminDashboard => {
            let user = current_user(ctx)?;
            let dashboard = AdminDashboard::load(&ctx.client).or_fail(LOAD_FAILED)?;
            Ok(dashboard.render(&user))
        }
        Route::Profile => {
            let user = current_user(ctx)?;
            let profile = Profile::load(&ctx.client, &user).or_fail(LOAD_FAILED)?;
            Ok(profile.render(&user, &ctx.draft.borrow()))
        }
        Route::Subscriptions => {
            let user = current_user(ctx)?;
            let list = SubscriptionList::load(&ctx.client, &user, Listing::Mine)
                .or_fail(LOAD_FAILED)?;
            Ok(list.render())
        }
    }
}

fn login(ctx: &Context, args: &[String]) -> Result<Reply, ViewError> {
    let email = arg(args, 0, "Usage: /login <email> [password]")?;
    let password = match args.get(1) {
        Some(password) => password.clone(),
        None => ask(ctx, "Password: ").unwrap_or_default(),
    };

    let was_authenticated = ctx.session.borrow().session().is_authenticated();
    let outcome = match auth::login(&ctx.client, &ctx.session, email, &password) {
        Ok(outcome) => outcome,
        Err(e) => {
            // A rejected attempt can still end the session that was open.
            if was_authenticated && !ctx.session.borrow().session().is_authenticated() {
                signed_out(ctx);
            }
            return Err(e);
        }
    };
    ctx.journal
        .borrow_mut()
        .login(&outcome.user.email, outcome.user.role.as_str());
    ctx.search.borrow_mut().clear();
    *ctx.draft.borrow_mut() = ProfileDraft::default();

    let mut message = format!("Welcome, {}!", outcome.user.name);
    if let Some(warning) = outcome.warning {
        warn!("{}", warning);
        message.push('\n');
        message.push_str(&warning);
    }
    let landing = Route::landing_for(&outcome.user.role);
    Ok(with_message(message, navigate(ctx, landing)?))
}

/// Leave the current view for Login after the session ended underneath it
fn signed_out(ctx: &Context) {
    let requested = *ctx.route.borrow();
    ctx.journal.borrow_mut().navigation(
        requested.path(),
        Route::Login.path(),
        Decision::RedirectToLogin.as_str(),
    );
    *ctx.route.borrow_mut() = Route::Login;
    ctx.search.borrow_mut().clear();
    *ctx.draft.borrow_mut() = ProfileDraft::default();
}

fn logout(ctx: &Context) -> Result<Reply, ViewError> {
    let was_authenticated = ctx.session.borrow().session().is_authenticated();
    if let Err(e) = ctx.session.borrow_mut().logout() {
        warn!(error = %e, "failed to clear persisted session");
    }
    if was_authenticated {
        ctx.journal.borrow_mut().logout();
    }
    ctx.search.borrow_mut().clear();
    *ctx.draft.borrow_mut() = ProfileDraft::default();
    Ok(with_message(
        "Logged out.".to_string(),
        navigate(ctx, Route::Login)?,
    ))
}

fn whoami(ctx: &Context) -> String {
    let mut out = match ctx.user() {
        Some(user) => format!(
            "{} <{}>\n  id:    {}\n  role:  {}\n",
            user.name, user.email, user.id, user.role
        ),
        None => "Not logged in\n".to_string(),
    };
    out.push_str(&format!("  view:    {}\n", ctx.route.borrow()));
    out.push_str(&format!("  backend: {}\n", ctx.config.api.base_url));
    let journal = ctx.journal.borrow();
    out.push_str(&format!("  run:     {}\n", journal.run_id()));
    if let Some(path) = &journal.path {
        out.push_str(&format!("  journal: {}\n", path.display()));
    }
    out
}

/// Read one line from the terminal. Returns `None` in one-shot mode.
fn ask(ctx: &Context, prompt: &str) -> Option<String> {
    if !ctx.interactive() {
        return None;
    }
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    Some(input.trim().to_string())
}

fn confirm(ctx: &Context, question: &str) -> bool {
    if ctx.args.yes {
        return true;
    }
    if !ctx.interactive() {
        println!("{} Re-run with --yes to confirm.", question);
        return false;
    }
    match ask(ctx, &format!("{} [y/N]: ", question)) {
        Some(answer) => {
            let answer = answer.to_lowercase();
            answer == "y" || answer == "yes"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::FakeTransport;
    use crate::api::client::{Body, Method};
    use crate::journal::Journal;
    use crate::session::{MemoryStorage, SessionStore};
    use clap::Parser;
    use serde_json::json;

    fn context(flags: &[&str]) -> (FakeTransport, Context) {
        let mut argv = vec!["jobdesk", "-c", "/help"];
        argv.extend_from_slice(flags);
        let args = Args::parse_from(argv);

        let transport = FakeTransport::new();
        let session = SessionStore::new(Box::new(MemoryStorage::new())).shared();
        let journal = Journal::disabled("test").shared();
        let client = ApiClient::for_session(
            "http://x/api",
            Box::new(transport.clone()),
            session.clone(),
            Some(journal.clone()),
        );
        let ctx = Context::new(args, Config::default(), session, client, journal);
        (transport, ctx)
    }

    fn sign_in(ctx: &Context, role: Role) {
        let user = User {
            id: 7,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role,
        };
        ctx.session.borrow_mut().login(user, "tok").unwrap();
    }

    fn run(ctx: &Context, line: &str) -> Result<String, ViewError> {
        let words = shell_words::split(line).unwrap();
        match dispatch(ctx, &words)? {
            Reply::Show(text) => Ok(text),
            Reply::Exit => Ok("<exit>".to_string()),
        }
    }

    #[test]
    fn test_protected_route_redirects_to_login() {
        let (t, ctx) = context(&[]);
        let text = run(&ctx, "/open /admin/dashboard").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::Login);
        assert!(text.contains("Please log in"));
        assert!(t.sent.borrow().is_empty());
    }

    #[test]
    fn test_wrong_role_is_denied_without_network() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        let text = run(&ctx, "/open /admin/dashboard").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::AccessDenied);
        assert!(text.contains("Access Denied"));

        run(&ctx, "/email a@example.com Hi there").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::AccessDenied);
        assert!(t.sent.borrow().is_empty());
    }

    #[test]
    fn test_login_lands_on_dashboard() {
        let (t, ctx) = context(&[]);
        t.reply_json(
            200,
            json!({"token": "abc", "userId": 3, "userName": "Rita", "userRole": "ROLE_RECRUITER"}),
        )
        .reply(200, "[]")
        .reply(200, "[]");
        let text = run(&ctx, "/login rita@example.com secret").unwrap();
        assert!(text.starts_with("Welcome, Rita!"));
        assert!(text.contains("Recruiter Dashboard"));
        assert_eq!(*ctx.route.borrow(), Route::RecruiterDashboard);
        assert_eq!(t.last().header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_login_without_password_in_one_shot_mode() {
        let (t, ctx) = context(&[]);
        assert!(matches!(
            run(&ctx, "/login rita@example.com"),
            Err(ViewError::Form(_))
        ));
        assert!(t.sent.borrow().is_empty());
    }

    #[test]
    fn test_expired_credential_forces_login() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        *ctx.route.borrow_mut() = Route::EmployeeDashboard;
        t.reply(401, "");

        assert_eq!(handle_command(&ctx, "/apply 4"), Outcome::Failed);
        assert!(!ctx.session.borrow().session().is_authenticated());
        assert_eq!(*ctx.route.borrow(), Route::Login);

        // The guard now sends every protected view to login.
        run(&ctx, "/open /employee/dashboard").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::Login);
        assert_eq!(t.sent.borrow().len(), 1);
    }

    #[test]
    fn test_failed_relogin_leaves_protected_view() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        *ctx.route.borrow_mut() = Route::EmployeeDashboard;
        t.reply(401, "");

        assert_eq!(
            handle_command(&ctx, "/login other@example.com wrongpw"),
            Outcome::Failed
        );
        assert!(!ctx.session.borrow().session().is_authenticated());
        assert_eq!(*ctx.route.borrow(), Route::Login);
    }

    #[test]
    fn test_failed_login_while_signed_out_keeps_route() {
        let (t, ctx) = context(&[]);
        t.reply(401, "");
        assert_eq!(
            handle_command(&ctx, "/login other@example.com wrongpw"),
            Outcome::Failed
        );
        assert_eq!(*ctx.route.borrow(), Route::Home);
    }

    #[test]
    fn test_load_failure_still_renders() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        t.fail("connection refused");
        let text = run(&ctx, "/dashboard").unwrap();
        assert!(text.contains("Employee Dashboard"));
        assert!(text.contains("! Error fetching data"));
        assert!(ctx.session.borrow().session().is_authenticated());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (_, ctx) = context(&[]);
        sign_in(&ctx, Role::Admin);
        run(&ctx, "/logout").unwrap();
        assert!(!ctx.session.borrow().session().is_authenticated());
        assert_eq!(*ctx.route.borrow(), Route::Login);
        run(&ctx, "/logout").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::Login);
    }

    #[test]
    fn test_deactivate_needs_confirmation_in_one_shot_mode() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Admin);
        t.reply_json(200, json!([{"id": 5, "courseTitle": "Rust", "active": true}]));
        let err = run(&ctx, "/deactivate-course 5").unwrap_err();
        assert_eq!(err.to_string(), "Deactivation cancelled");
        assert!(t.paths().iter().all(|p| !p.contains("deactivate")));
    }

    #[test]
    fn test_deactivate_with_yes() {
        let (t, ctx) = context(&["--yes"]);
        sign_in(&ctx, Role::Admin);
        t.reply_json(200, json!([{"id": 5, "courseTitle": "Rust", "active": true}]))
            .reply(200, "");
        let text = run(&ctx, "/deactivate-course 5").unwrap();
        assert!(text.starts_with("Course deactivated successfully!"));
        let put = &t.sent.borrow()[1];
        assert_eq!(put.method, Method::Put);
        assert_eq!(put.path, "/courses/deactivate/5");
        assert_eq!(put.body, Body::Empty);
    }

    #[test]
    fn test_subscription_listings() {
        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        run(&ctx, "/subscriptions all").unwrap();
        assert_eq!(*ctx.route.borrow(), Route::AccessDenied);
        assert!(t.sent.borrow().is_empty());

        t.reply(200, "[]");
        run(&ctx, "/subscriptions").unwrap();
        assert_eq!(t.paths(), vec!["/subscriptions/user/email/sam%40example.com"]);
    }

    #[test]
    fn test_upload_then_edit_saves_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cv.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        let (t, ctx) = context(&[]);
        sign_in(&ctx, Role::Employee);
        t.reply(200, "https://files/cv.pdf").reply(200, "{}");
        run(&ctx, &format!("/upload-resume '{}'", file.display())).unwrap();
        assert_eq!(
            ctx.draft.borrow().resume_url.as_deref(),
            Some("https://files/cv.pdf")
        );

        t.reply(200, "{}").reply(200, "").reply(200, "{}");
        run(&ctx, "/edit phone=555").unwrap();
        assert!(ctx.draft.borrow().is_empty());
        let update = t
            .sent
            .borrow()
            .iter()
            .find(|r| r.path == "/employees/update")
            .cloned()
            .unwrap();
        let Body::Json(body) = update.body else {
            panic!("expected json body");
        };
        assert_eq!(body["resumeURL"], "https://files/cv.pdf");
        assert_eq!(body["email"], "sam@example.com");
    }

    #[test]
    fn test_unknown_command_and_usage() {
        let (_, ctx) = context(&[]);
        assert!(run(&ctx, "/frobnicate").is_err());
        assert!(run(&ctx, "/apply").is_err());
        assert_eq!(run(&ctx, "/exit").unwrap(), "<exit>");
        assert!(ctx.prompt().contains("/login"));
    }
}
