//! Session gate: decide whether the driven browser is logged in, and block on
//! the operator until it is.
//!
//! Cookies are restored from `<data_dir>/session/cookies.json` before the
//! first probe and saved again after every operator-confirmed login.

use std::io;
use std::path::{Path, PathBuf};

use crate::browser::{PageDriver, SessionCookie};
use crate::config::SiteUrls;
use crate::error::ClapperError;
use crate::extract::display_name_from_title;
use crate::state_machine::{LoginEvent, LoginMachine, LoginState};
use crate::store::{StoreError, write_atomic};

/// Present in the page header only while signed out.
pub const SIGN_IN_CONTROL: &str = "button[data-testid='headerSignUpButton']";

/// External "the operator finished logging in" signal.
pub trait OperatorSignal {
    /// Block until the operator confirms. `Err(LoginAbandoned)` if they never will.
    async fn await_login(&self) -> Result<(), ClapperError>;
}

/// Saved browser cookies, so later runs skip the manual login.
#[derive(Debug, Clone)]
pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session").join("cookies.json"),
        }
    }

    pub fn load(&self) -> Result<Vec<SessionCookie>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, cookies: &[SessionCookie]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(cookies)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Outcome of a successful gate pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    /// Display name of the logged-in account, used to skip its own articles.
    pub display_name: String,
    /// How many times the operator had to log in by hand.
    pub prompts: u32,
}

/// Probe `entry_url` until no sign-in control is rendered, then read the
/// account's display name from its own profile.
pub async fn ensure_authenticated(
    page: &mut impl PageDriver,
    urls: &SiteUrls,
    entry_url: &str,
    jar: &CookieJar,
    operator: &impl OperatorSignal,
) -> Result<AuthenticatedSession, ClapperError> {
    let saved = jar.load()?;
    if !saved.is_empty() {
        // Cookies can only be set for the domain currently loaded.
        page.goto(entry_url).await?;
        page.add_cookies(&saved).await?;
        tracing::debug!(count = saved.len(), "restored session cookies");
    }

    let mut machine = LoginMachine::default();
    while !machine.is_authenticated() {
        match machine.state() {
            LoginState::Checking => {
                page.goto(entry_url).await?;
                let event = if page.has_element(SIGN_IN_CONTROL).await? {
                    LoginEvent::SignInControlFound
                } else {
                    LoginEvent::SignInControlAbsent
                };
                let state = machine.next(event);
                tracing::info!(%state, "checked credentials");
            }
            LoginState::AwaitingHuman => {
                operator.await_login().await?;
                let cookies = page.cookies().await?;
                jar.save(&cookies)?;
                tracing::debug!(count = cookies.len(), "saved session cookies");
                machine.next(LoginEvent::OperatorConfirmed);
            }
            LoginState::Authenticated => {}
        }
    }
    tracing::debug!(history = ?machine.history(), "login gate passed");

    page.goto(&urls.own_profile()).await?;
    let markup = page.content().await?;
    let display_name = display_name_from_title(&markup).ok_or(ClapperError::DisplayNameMissing)?;
    tracing::info!(display_name = %display_name, prompts = machine.prompts(), "session authenticated");

    Ok(AuthenticatedSession {
        display_name,
        prompts: machine.prompts(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakePage;
    use std::cell::Cell;
    use tempfile::TempDir;

    const ENTRY: &str = "https://medium.com/@jane";
    const ME: &str = "https://medium.com/me";
    const ME_MARKUP: &str = "<html><head><title>Sam Reader – Medium</title></head></html>";

    struct ScriptedOperator {
        confirms: Cell<u32>,
        gives_up: bool,
    }

    impl ScriptedOperator {
        fn patient() -> Self {
            Self {
                confirms: Cell::new(0),
                gives_up: false,
            }
        }

        fn gives_up() -> Self {
            Self {
                confirms: Cell::new(0),
                gives_up: true,
            }
        }
    }

    impl OperatorSignal for ScriptedOperator {
        async fn await_login(&self) -> Result<(), ClapperError> {
            if self.gives_up {
                return Err(ClapperError::LoginAbandoned);
            }
            self.confirms.set(self.confirms.get() + 1);
            Ok(())
        }
    }

    fn session_cookie() -> SessionCookie {
        SessionCookie {
            name: "sid".into(),
            value: "s3cr3t".into(),
            domain: Some(".medium.com".into()),
            path: Some("/".into()),
            secure: true,
            http_only: true,
        }
    }

    #[tokio::test]
    async fn logged_in_session_passes_without_prompt() {
        let dir = TempDir::new().unwrap();
        let jar = CookieJar::new(dir.path());
        let operator = ScriptedOperator::patient();
        let mut page = FakePage::new().with_page(ME, ME_MARKUP);

        let session = ensure_authenticated(&mut page, &SiteUrls::new("https://medium.com"), ENTRY, &jar, &operator)
            .await
            .unwrap();

        assert_eq!(session.display_name, "Sam Reader");
        assert_eq!(session.prompts, 0);
        assert_eq!(operator.confirms.get(), 0);
        assert_eq!(page.visits, vec![ENTRY.to_string(), ME.to_string()]);
    }

    #[tokio::test]
    async fn waits_for_operator_until_sign_in_control_disappears() {
        let dir = TempDir::new().unwrap();
        let jar = CookieJar::new(dir.path());
        let operator = ScriptedOperator::patient();
        let mut page = FakePage::new()
            .with_page(ME, ME_MARKUP)
            .with_element_sequence(SIGN_IN_CONTROL, vec![true, true, false]);
        page.cookies = vec![session_cookie()];

        let session = ensure_authenticated(&mut page, &SiteUrls::new("https://medium.com"), ENTRY, &jar, &operator)
            .await
            .unwrap();

        assert_eq!(session.prompts, 2);
        assert_eq!(operator.confirms.get(), 2);
        assert_eq!(jar.load().unwrap(), vec![session_cookie()]);
        // One probe navigation per check, then the account page.
        assert_eq!(page.visits.len(), 4);
    }

    #[tokio::test]
    async fn saved_cookies_are_restored_before_probing() {
        let dir = TempDir::new().unwrap();
        let jar = CookieJar::new(dir.path());
        jar.save(&[session_cookie()]).unwrap();
        let mut page = FakePage::new().with_page(ME, ME_MARKUP);

        ensure_authenticated(
            &mut page,
            &SiteUrls::new("https://medium.com"),
            ENTRY,
            &jar,
            &ScriptedOperator::patient(),
        )
        .await
        .unwrap();

        assert_eq!(page.cookies, vec![session_cookie()]);
        assert_eq!(page.visits[..2], [ENTRY.to_string(), ENTRY.to_string()]);
    }

    #[tokio::test]
    async fn abandoned_login_fails_the_gate() {
        let dir = TempDir::new().unwrap();
        let mut page = FakePage::new().with_element_sequence(SIGN_IN_CONTROL, vec![true]);

        let err = ensure_authenticated(
            &mut page,
            &SiteUrls::new("https://medium.com"),
            ENTRY,
            &CookieJar::new(dir.path()),
            &ScriptedOperator::gives_up(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClapperError::LoginAbandoned));
    }

    #[tokio::test]
    async fn missing_account_title_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut page = FakePage::new().with_page(ME, "<html><title>Medium</title></html>");

        let err = ensure_authenticated(
            &mut page,
            &SiteUrls::new("https://medium.com"),
            ENTRY,
            &CookieJar::new(dir.path()),
            &ScriptedOperator::patient(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClapperError::DisplayNameMissing));
    }
}
