//! Profile view for job seekers and recruiters, including file uploads.

use super::forms::Form;
use super::{or_unset, settle, OrFail, Screen, ViewError};
use crate::api::models::{EmployeeProfile, RecruiterProfile};
use crate::api::{ApiClient, ApiError};
use crate::session::{Role, User};
use std::path::Path;
use tracing::debug;

const EMPLOYEE_FIELDS: &[&str] = &["name", "phone", "qualification", "resumeURL", "imageURL"];
const RECRUITER_FIELDS: &[&str] = &[
    "recruiterName",
    "companyName",
    "recruiterPhone",
    "designation",
    "imageURL",
];

/// Uploaded file URLs waiting to be saved with the next profile edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub resume_url: Option<String>,
    pub image_url: Option<String>,
}

impl ProfileDraft {
    pub fn is_empty(&self) -> bool {
        self.resume_url.is_none() && self.image_url.is_none()
    }
}

#[derive(Debug)]
pub enum ProfileView {
    Employee(EmployeeProfile),
    Recruiter(RecruiterProfile),
    /// Roles without a backend profile (administrators)
    Account,
}

pub struct Profile {
    pub view: ProfileView,
    pub notices: Vec<String>,
}

impl Profile {
    pub fn load(client: &ApiClient, user: &User) -> Result<Self, ApiError> {
        let mut notices = Vec::new();
        let view = match user.role {
            Role::Employee => ProfileView::Employee(settle(
                client.employees().profile(&user.email),
                "Error fetching profile",
                &mut notices,
            )?),
            Role::Recruiter => ProfileView::Recruiter(settle(
                client.recruiters().profile(&user.email),
                "Error fetching profile",
                &mut notices,
            )?),
            _ => ProfileView::Account,
        };
        Ok(Self { view, notices })
    }

    pub fn render(&self, user: &User, draft: &ProfileDraft) -> String {
        let mut screen = Screen::new("My Profile");
        screen.notices(&self.notices);
        screen.blank();
        match &self.view {
            ProfileView::Employee(p) => {
                screen
                    .stat("Name:", or_unset(&p.name))
                    .stat("Email:", &user.email)
                    .stat("Phone:", or_unset(&p.phone))
                    .stat("Qualification:", or_unset(&p.qualification))
                    .stat(
                        "Resume:",
                        p.resume_url.as_deref().unwrap_or("Not uploaded"),
                    );
                screen.blank();
                screen.line("Edit: /edit name=... phone=... qualification=...");
                screen.line("Upload resume: /upload-resume <file>");
            }
            ProfileView::Recruiter(p) => {
                screen
                    .stat("Name:", or_unset(&p.recruiter_name))
                    .stat("Email:", &user.email)
                    .stat("Company:", or_unset(&p.company_name))
                    .stat("Phone:", or_unset(&p.recruiter_phone))
                    .stat("Designation:", or_unset(&p.designation));
                screen.blank();
                screen.line("Edit: /edit recruiterName=... companyName=... recruiterPhone=... designation=...");
            }
            ProfileView::Account => {
                screen
                    .stat("Name:", &user.name)
                    .stat("Email:", &user.email)
                    .stat("Role:", &user.role);
            }
        }
        if !draft.is_empty() {
            screen.section("Unsaved uploads (saved by the next /edit)");
            if let Some(url) = &draft.resume_url {
                screen.stat("Resume:", url);
            }
            if let Some(url) = &draft.image_url {
                screen.stat("Image:", url);
            }
        }
        screen.finish()
    }
}

/// Apply `form` and any pending uploads on top of the stored profile and save it
pub fn save(
    client: &ApiClient,
    user: &User,
    form: &Form,
    draft: &ProfileDraft,
) -> Result<String, ViewError> {
    const FAILED: &str = "Failed to update profile";
    match user.role {
        Role::Employee => {
            form.only(EMPLOYEE_FIELDS)?;
            let mut profile = stored(client.employees().profile(&user.email))?;
            for (key, value) in form.iter() {
                let value = Some(value.to_string());
                match key {
                    "name" => profile.name = value,
                    "phone" => profile.phone = value,
                    "qualification" => profile.qualification = value,
                    "resumeURL" => profile.resume_url = value,
                    "imageURL" => profile.image_url = value,
                    _ => {}
                }
            }
            if draft.resume_url.is_some() {
                profile.resume_url = draft.resume_url.clone();
            }
            if draft.image_url.is_some() {
                profile.image_url = draft.image_url.clone();
            }
            profile.email = Some(user.email.clone());
            client.employees().update(&profile).or_fail(FAILED)?;
        }
        Role::Recruiter => {
            form.only(RECRUITER_FIELDS)?;
            let mut profile = stored(client.recruiters().profile(&user.email))?;
            for (key, value) in form.iter() {
                let value = Some(value.to_string());
                match key {
                    "recruiterName" => profile.recruiter_name = value,
                    "companyName" => profile.company_name = value,
                    "recruiterPhone" => profile.recruiter_phone = value,
                    "designation" => profile.designation = value,
                    "imageURL" => profile.image_url = value,
                    _ => {}
                }
            }
            if draft.image_url.is_some() {
                profile.image_url = draft.image_url.clone();
            }
            profile.recruiter_email = Some(user.email.clone());
            client.recruiters().save(&profile).or_fail(FAILED)?;
        }
        _ => {
            return Err(ViewError::Refused(
                "This account has no editable profile".to_string(),
            ))
        }
    }
    Ok("Profile updated successfully!".to_string())
}

/// The profile saved so far, or a blank one when the user has none yet.
/// A rejected credential still aborts the save.
fn stored<T: Default>(loaded: Result<T, ApiError>) -> Result<T, ViewError> {
    match loaded {
        Ok(profile) => Ok(profile),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized).or_fail("Failed to update profile"),
        Err(e) => {
            debug!(error = %e, "no stored profile, starting blank");
            Ok(T::default())
        }
    }
}

/// What kind of file is being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upload {
    Resume,
    Image,
}

/// Upload a file and remember its URL in `draft`
pub fn upload(
    client: &ApiClient,
    kind: Upload,
    path: &Path,
    draft: &mut ProfileDraft,
) -> Result<String, ViewError> {
    let data = std::fs::read(path).map_err(|source| ViewError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    match kind {
        Upload::Resume => {
            let url = client
                .files()
                .upload_resume(filename, &data)
                .or_fail("Failed to upload resume")?;
            draft.resume_url = Some(url);
            Ok("Resume uploaded successfully! Run /edit to save it to your profile.".to_string())
        }
        Upload::Image => {
            let url = client
                .files()
                .upload_image(filename, &data)
                .or_fail("Failed to upload image")?;
            draft.image_url = Some(url);
            Ok("Image uploaded successfully! Run /edit to save it to your profile.".to_string())
        }
    }
}
