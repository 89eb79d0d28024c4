use tracing::{info, warn};

use crate::error::{Result, ScrapeError};
use crate::progress::Progress;
use crate::scrapers::page::{Page, Waiter};
use crate::scrapers::types::MarkupRules;

/// Account identifier and secret for the site's login form
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Log in through the site's form.
///
/// Success is judged only by the tab leaving the login URL before the
/// waiter gives up; a rejected password and a slow redirect look the same.
pub fn login(
    page: &mut dyn Page,
    login_url: &str,
    credentials: &Credentials,
    rules: &MarkupRules,
    waiter: Waiter,
    progress: &mut dyn Progress,
) -> Result<()> {
    let auth_err = |e: anyhow::Error| ScrapeError::Authentication(format!("{e:#}"));

    progress.log("Opening login page...");
    page.navigate(login_url)
        .map_err(|e| ScrapeError::Navigation(format!("{login_url}: {e:#}")))?;

    if !waiter
        .for_element(page, &rules.email_input)
        .map_err(auth_err)?
    {
        return Err(ScrapeError::Authentication(format!(
            "login form did not appear at {login_url}"
        )));
    }

    progress.log("Entering credentials...");
    page.fill(&rules.email_input, &credentials.email)
        .map_err(auth_err)?;
    page.fill(&rules.password_input, &credentials.password)
        .map_err(auth_err)?;

    progress.log("Submitting login form...");
    page.click(&rules.submit_button).map_err(auth_err)?;

    let left_login = waiter
        .until(|| Ok(!page.current_url().contains(&rules.login_url_marker)))
        .map_err(auth_err)?;
    if !left_login {
        warn!("Still on {} after submitting credentials", page.current_url());
        return Err(ScrapeError::Authentication(
            "still on the login page; check the email address and password".to_string(),
        ));
    }

    info!("Logged in as {}", credentials.email);
    progress.log("Logged in");
    Ok(())
}
