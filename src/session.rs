/*!
 * Session authentication
 */

use irods_core_interface::{AccessObjectFactory, GridError, GridSession, IrodsAccount, Result};
use tracing::{debug, info};

/// Authenticate `account` through `factory`
///
/// Every failure, whether the host is unreachable, the handshake is garbled or
/// the credentials are rejected, comes back as
/// [`GridError::AuthenticationFailed`] with the cause kept as its source.
#[tracing::instrument(
    skip(factory, account),
    fields(account = %account)
)]
pub async fn authenticate(
    factory: &dyn AccessObjectFactory,
    account: &IrodsAccount,
) -> Result<Box<dyn GridSession>> {
    match factory.authenticate(account).await {
        Ok(session) => {
            info!(home = account.home_directory(), "Authenticated");
            Ok(session)
        }
        Err(source) => {
            debug!(error = %source, "Authentication failed");
            Err(GridError::AuthenticationFailed {
                account: format!("{}#{}", account.user_name(), account.zone()),
                source: Box::new(source),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use irods_core_interface::{RemoteRead, RemoteWrite};
    use secrecy::SecretString;

    struct StubSession(IrodsAccount);

    #[async_trait]
    impl GridSession for StubSession {
        fn account(&self) -> &IrodsAccount {
            &self.0
        }

        async fn open_write(&self, _path: &str) -> Result<Box<dyn RemoteWrite>> {
            Err(GridError::Protocol("unused".to_string()))
        }

        async fn open_read(&self, _path: &str) -> Result<Box<dyn RemoteRead>> {
            Err(GridError::Protocol("unused".to_string()))
        }
    }

    enum Outcome {
        Accept,
        Reject,
        Unreachable,
    }

    struct StubFactory(Outcome);

    #[async_trait]
    impl AccessObjectFactory for StubFactory {
        async fn authenticate(&self, account: &IrodsAccount) -> Result<Box<dyn GridSession>> {
            match self.0 {
                Outcome::Accept => Ok(Box::new(StubSession(account.clone()))),
                Outcome::Reject => Err(GridError::Server {
                    code: -826000,
                    name: "CAT_INVALID_AUTHENTICATION",
                    messages: vec![],
                }),
                Outcome::Unreachable => Err(GridError::Connection {
                    endpoint: account.endpoint(),
                    source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
                }),
            }
        }
    }

    fn account() -> IrodsAccount {
        IrodsAccount::new(
            "localhost",
            1247,
            "alice",
            SecretString::new("rods".to_string().into_boxed_str()),
            "tempZone",
        )
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let session = authenticate(&StubFactory(Outcome::Accept), &account())
            .await
            .unwrap();
        assert_eq!(session.account().user_name(), "alice");
    }

    #[tokio::test]
    async fn test_rejected_credentials_collapse() {
        let err = authenticate(&StubFactory(Outcome::Reject), &account())
            .await
            .err()
            .unwrap();
        assert!(err.is_auth_error());
        assert_eq!(err.server_code(), Some(-826000));
        assert_eq!(err.to_string(), "authentication failed for alice#tempZone");
    }

    #[tokio::test]
    async fn test_unreachable_host_collapses() {
        let err = authenticate(&StubFactory(Outcome::Unreachable), &account())
            .await
            .err()
            .unwrap();
        assert!(err.is_auth_error());
        assert_eq!(err.server_code(), None);
    }
}
