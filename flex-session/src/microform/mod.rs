//! Card-entry widget capability.
//!
//! The gateway's microform widget collects the card number and security code in hosted
//! fields and exchanges them, with a [`SessionToken`], for a transient [`CardToken`]. This
//! module does not implement the widget. It defines the contract a widget binding fulfils
//! ([`MicroformFactory`], [`Microform`], [`MicroformField`]) and drives it through
//! [`MicroformSession`]:
//!
//! 1. [`MicroformSession::mount`] opens the widget for a session and loads the `number` and
//!    `securityCode` fields into their containers.
//! 2. [`MicroformSession::get_token`] adapts the widget's completion callback into a future
//!    that resolves exactly once.
//!
//! # Examples
//!
//! ```
//! use flex_session::{
//!     error::Result,
//!     microform::{
//!         CreateTokenOptions, FieldKind, Microform, MicroformFactory, MicroformField,
//!         MicroformSession, TokenCallback,
//!     },
//!     session::SessionToken,
//! };
//!
//! #[derive(Debug)]
//! struct StaticField;
//!
//! impl MicroformField for StaticField {
//!     fn load(&self, _selector: &str) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StaticWidget;
//!
//! impl Microform for StaticWidget {
//!     type Field = StaticField;
//!
//!     fn create_field(&self, _kind: FieldKind) -> Result<StaticField> {
//!         Ok(StaticField)
//!     }
//!
//!     fn create_token(&self, _options: &CreateTokenOptions, callback: TokenCallback) {
//!         callback(Ok("card-token".to_owned()));
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StaticFactory;
//!
//! impl MicroformFactory for StaticFactory {
//!     type Microform = StaticWidget;
//!
//!     fn microform(&self, _session: &SessionToken) -> Result<StaticWidget> {
//!         Ok(StaticWidget)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let session = SessionToken::new("session-jwt");
//! let form = MicroformSession::mount(&StaticFactory, &session, "card-number", "security-code")?;
//!
//! let token = form.get_token(&CreateTokenOptions::new("04", "2031")).await?;
//! assert_eq!(token.as_str(), "card-token");
//! # Ok(())
//! # }
//! ```

use std::fmt;

use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Result, SessionError},
    session::{CardToken, SessionToken},
};

mod options;

pub use options::{
    CreateTokenOptions, EXPIRATION_YEAR_COUNT, expiration_months, expiration_years,
};

/// Outcome reported by the widget: the card token, or the widget's error message.
pub type TokenOutcome = std::result::Result<String, String>;

/// Completion callback handed to [`Microform::create_token`].
///
/// Call it at most once. Dropping it without calling it fails the pending request.
pub type TokenCallback = Box<dyn FnOnce(TokenOutcome) + Send + 'static>;

/// Hosted field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Card number.
    Number,
    /// Card security code.
    SecurityCode,
}

impl FieldKind {
    /// Field name as the widget expects it.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::SecurityCode => "securityCode",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A hosted field created by the widget.
pub trait MicroformField {
    /// Renders the field into the element matched by `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot attach to the selector.
    fn load(&self, selector: &str) -> Result<()>;
}

/// A widget instance bound to one session.
pub trait Microform: Send + Sync {
    /// Field handle type.
    type Field: MicroformField;

    /// Creates a hosted field.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget refuses the field.
    fn create_field(&self, kind: FieldKind) -> Result<Self::Field>;

    /// Starts tokenization of the entered card; the outcome is delivered through `callback`.
    fn create_token(&self, options: &CreateTokenOptions, callback: TokenCallback);
}

/// Opens widget instances for a session.
pub trait MicroformFactory {
    /// Widget instance type.
    type Microform: Microform;

    /// Opens a widget for `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget rejects the session.
    fn microform(&self, session: &SessionToken) -> Result<Self::Microform>;
}

/// A mounted widget with its number and security code fields loaded.
pub struct MicroformSession<M: Microform> {
    microform: M,
    number: M::Field,
    security_code: M::Field,
}

impl<M: Microform> fmt::Debug for MicroformSession<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicroformSession").finish_non_exhaustive()
    }
}

impl<M: Microform> MicroformSession<M> {
    /// Opens the widget for `session` and loads both fields into `#{container_id}`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] for an empty or malformed container id, or
    /// any error reported by the widget.
    #[instrument(skip(factory, session))]
    pub fn mount<F>(
        factory: &F,
        session: &SessionToken,
        number_container_id: &str,
        security_code_container_id: &str,
    ) -> Result<Self>
    where
        F: MicroformFactory<Microform = M>,
    {
        let number_selector = container_selector(number_container_id)?;
        let security_code_selector = container_selector(security_code_container_id)?;

        let microform = factory.microform(session)?;

        let number = microform.create_field(FieldKind::Number)?;
        let security_code = microform.create_field(FieldKind::SecurityCode)?;

        number.load(&number_selector)?;
        security_code.load(&security_code_selector)?;

        debug!("microform fields loaded");
        Ok(Self { microform, number, security_code })
    }

    /// Returns the underlying widget.
    pub const fn microform(&self) -> &M {
        &self.microform
    }

    /// Returns the field handle for `kind`.
    pub const fn field(&self, kind: FieldKind) -> &M::Field {
        match kind {
            FieldKind::Number => &self.number,
            FieldKind::SecurityCode => &self.security_code,
        }
    }

    /// Requests a card token for the entered card.
    ///
    /// Resolves once, with the first outcome the widget reports.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidConfig`]: malformed options, the widget was not called
    /// - [`SessionError::TokenizationError`]: the widget reported an error or dropped the
    ///   callback without reporting
    #[instrument(skip(self, options))]
    pub async fn get_token(&self, options: &CreateTokenOptions) -> Result<CardToken> {
        options.validate()?;

        let (tx, rx) = oneshot::channel::<TokenOutcome>();
        let callback: TokenCallback = Box::new(move |outcome| {
            if tx.send(outcome).is_err() {
                debug!("token request abandoned before the widget answered");
            }
        });
        self.microform.create_token(options, callback);

        match rx.await {
            Ok(Ok(token)) => {
                debug!(token_len = token.len(), "card token created");
                Ok(CardToken::new(token))
            }
            Ok(Err(message)) => {
                warn!(%message, "widget reported a tokenization failure");
                Err(SessionError::TokenizationError(message))
            }
            Err(_) => Err(SessionError::TokenizationError(
                "widget dropped the callback without a result".to_owned(),
            )),
        }
    }
}

fn container_selector(container_id: &str) -> Result<String> {
    let id = container_id.trim();
    if id.is_empty() {
        return Err(SessionError::InvalidConfig("container id is empty".to_owned()));
    }
    if id.starts_with('#') || id.contains(char::is_whitespace) {
        return Err(SessionError::InvalidConfig(format!(
            "container id must be a bare element id, got: {container_id:?}"
        )));
    }
    Ok(format!("#{id}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Token,
        Failure,
        Drop,
        FromOtherThread,
    }

    #[derive(Debug, Default)]
    struct Log {
        sessions: Vec<String>,
        fields: Vec<String>,
        loads: Vec<(String, String)>,
        token_requests: usize,
    }

    #[derive(Debug)]
    struct FakeField {
        kind: FieldKind,
        log: Arc<Mutex<Log>>,
    }

    impl MicroformField for FakeField {
        fn load(&self, selector: &str) -> Result<()> {
            self.log.lock().unwrap().loads.push((self.kind.to_string(), selector.to_owned()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FakeWidget {
        reply: Reply,
        log: Arc<Mutex<Log>>,
    }

    impl Microform for FakeWidget {
        type Field = FakeField;

        fn create_field(&self, kind: FieldKind) -> Result<FakeField> {
            self.log.lock().unwrap().fields.push(kind.wire_name().to_owned());
            Ok(FakeField { kind, log: Arc::clone(&self.log) })
        }

        fn create_token(&self, _options: &CreateTokenOptions, callback: TokenCallback) {
            self.log.lock().unwrap().token_requests += 1;
            match self.reply {
                Reply::Token => callback(Ok("card.jwt.sig".to_owned())),
                Reply::Failure => callback(Err("Validation error".to_owned())),
                Reply::Drop => drop(callback),
                Reply::FromOtherThread => {
                    std::thread::spawn(move || callback(Ok("late.jwt.sig".to_owned())))
                        .join()
                        .unwrap();
                }
            }
        }
    }

    #[derive(Debug)]
    struct FakeFactory {
        reply: Reply,
        log: Arc<Mutex<Log>>,
    }

    impl FakeFactory {
        fn new(reply: Reply) -> Self {
            Self { reply, log: Arc::default() }
        }
    }

    impl MicroformFactory for FakeFactory {
        type Microform = FakeWidget;

        fn microform(&self, session: &SessionToken) -> Result<FakeWidget> {
            self.log.lock().unwrap().sessions.push(session.as_str().to_owned());
            Ok(FakeWidget { reply: self.reply, log: Arc::clone(&self.log) })
        }
    }

    fn mount(factory: &FakeFactory) -> MicroformSession<FakeWidget> {
        MicroformSession::mount(factory, &SessionToken::new("session"), "cc-number", "cc-cvv")
            .unwrap()
    }

    #[test]
    fn test_field_kind_wire_names() {
        assert_eq!(FieldKind::Number.wire_name(), "number");
        assert_eq!(FieldKind::SecurityCode.to_string(), "securityCode");
    }

    #[test]
    fn test_mount_creates_and_loads_fields() {
        let factory = FakeFactory::new(Reply::Token);
        let form = mount(&factory);

        let log = factory.log.lock().unwrap();
        assert_eq!(log.sessions, ["session"]);
        assert_eq!(log.fields, ["number", "securityCode"]);
        assert_eq!(
            log.loads,
            [
                ("number".to_owned(), "#cc-number".to_owned()),
                ("securityCode".to_owned(), "#cc-cvv".to_owned())
            ]
        );
        assert_eq!(form.field(FieldKind::SecurityCode).kind, FieldKind::SecurityCode);
    }

    #[test]
    fn test_mount_rejects_bad_container_ids() {
        let factory = FakeFactory::new(Reply::Token);
        for id in ["", "  ", "#cc-number", "cc number"] {
            let result =
                MicroformSession::mount(&factory, &SessionToken::new("s"), id, "cc-cvv");
            assert!(matches!(result.unwrap_err(), SessionError::InvalidConfig(_)), "{id:?}");
        }
        assert!(factory.log.lock().unwrap().sessions.is_empty());
    }

    #[tokio::test]
    async fn test_get_token_success() {
        let factory = FakeFactory::new(Reply::Token);
        let form = mount(&factory);

        let token = form.get_token(&CreateTokenOptions::new("12", "2030")).await.unwrap();
        assert_eq!(token.as_str(), "card.jwt.sig");
    }

    #[tokio::test]
    async fn test_get_token_widget_failure() {
        let factory = FakeFactory::new(Reply::Failure);
        let form = mount(&factory);

        let err = form.get_token(&CreateTokenOptions::new("12", "2030")).await.unwrap_err();
        match err {
            SessionError::TokenizationError(message) => assert_eq!(message, "Validation error"),
            other => panic!("expected TokenizationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_token_dropped_callback() {
        let factory = FakeFactory::new(Reply::Drop);
        let form = mount(&factory);

        let err = form.get_token(&CreateTokenOptions::new("01", "2030")).await.unwrap_err();
        assert!(matches!(err, SessionError::TokenizationError(_)));
    }

    #[tokio::test]
    async fn test_get_token_callback_from_other_thread() {
        let factory = FakeFactory::new(Reply::FromOtherThread);
        let form = mount(&factory);

        let token = form.get_token(&CreateTokenOptions::new("01", "2030")).await.unwrap();
        assert_eq!(token.as_str(), "late.jwt.sig");
    }

    #[tokio::test]
    async fn test_get_token_invalid_options_skip_widget() {
        let factory = FakeFactory::new(Reply::Token);
        let form = mount(&factory);

        let err = form.get_token(&CreateTokenOptions::new("13", "2030")).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
        assert_eq!(factory.log.lock().unwrap().token_requests, 0);
    }
}
