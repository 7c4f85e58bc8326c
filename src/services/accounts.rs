use crate::{
    auth::{
        issue_token,
        password::{hash_password_blocking, verify_password_blocking},
    },
    config::Config,
    db::UserStore,
    error::{AppError, AppResult},
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserSummary},
};

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose `local@domain.tld` check
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Validates a registration body into a ready-to-hash account
fn validate_registration(request: &RegisterRequest) -> AppResult<(String, String, Role)> {
    let name = request.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::InvalidInput(
            "Name must be at least 2 characters".to_string(),
        ));
    }

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("Valid email required".to_string()));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let role = request
        .role
        .parse::<Role>()
        .map_err(|_| AppError::InvalidInput("Invalid role".to_string()))?;

    Ok((name.to_string(), email, role))
}

fn session(message: &str, user: &User, config: &Config) -> AppResult<AuthResponse> {
    let token = issue_token(user, &config.jwt_secret, config.jwt_expiry_hours)?;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: UserSummary::from(user),
    })
}

/// Creates an account and issues its first session token
pub async fn register<U: UserStore + ?Sized>(
    users: &U,
    config: &Config,
    request: RegisterRequest,
) -> AppResult<AuthResponse> {
    let (name, email, role) = validate_registration(&request)?;
    let password_hash = hash_password_blocking(request.password).await?;

    let user = users
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await?
        .ok_or_else(|| AppError::InvalidInput("Email already registered".to_string()))?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    session("User registered successfully", &user, config)
}

/// Checks credentials and issues a session token
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login<U: UserStore + ?Sized>(
    users: &U,
    config: &Config,
    request: LoginRequest,
) -> AppResult<AuthResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Valid email and password required".to_string(),
        ));
    }

    let credentials = users
        .find_credentials_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !credentials.user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    if !verify_password_blocking(request.password, credentials.password_hash).await? {
        tracing::info!(user_id = credentials.user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    users.record_login(credentials.user.id).await?;

    session("Login successful", &credentials.user, config)
}

/// Loads the caller's account
pub async fn current_user<U: UserStore + ?Sized>(users: &U, user_id: i64) -> AppResult<User> {
    users
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{password::hash_password, verify_token},
        db::store::MockUserStore,
        models::UserCredentials,
    };
    use chrono::Utc;

    fn config() -> Config {
        Config::from_pairs(vec![("JWT_SECRET".to_string(), "unit-secret".to_string())]).unwrap()
    }

    fn registration(name: &str, email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    fn stored_user(id: i64, email: &str, role: Role, is_active: bool) -> User {
        User {
            id,
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            role,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada example@example.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_registration_validation_messages() {
        let cases = [
            (registration(" A ", "ada@example.com", "secret", "student"), "Name"),
            (registration("Ada", "not-an-email", "secret", "student"), "email"),
            (registration("Ada", "ada@example.com", "short", "student"), "Password"),
            (registration("Ada", "ada@example.com", "secret", "teacher"), "Invalid role"),
        ];

        for (request, needle) in cases {
            match validate_registration(&request) {
                Err(AppError::InvalidInput(msg)) => assert!(msg.contains(needle), "{}", msg),
                other => panic!("expected invalid input, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_registration_accepts_every_role() {
        for role in ["student", "peer_mentor", "admin"] {
            let (name, email, parsed) =
                validate_registration(&registration(" Ada ", "ADA@example.com", "secret", role))
                    .unwrap();
            assert_eq!(name, "Ada");
            assert_eq!(email, "ada@example.com");
            assert_eq!(parsed.as_str(), role);
        }
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let mut users = MockUserStore::new();
        users
            .expect_create_user()
            .withf(|new_user| {
                new_user.email == "ada@example.com"
                    && new_user.role == Role::PeerMentor
                    && new_user.password_hash.starts_with("$argon2")
            })
            .returning(|new_user| Ok(Some(stored_user(9, &new_user.email, new_user.role, true))));

        let config = config();
        let response = register(
            &users,
            &config,
            registration("Ada", "Ada@Example.com", "secret", "peer_mentor"),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "User registered successfully");
        assert_eq!(response.user.id, 9);
        let claims = verify_token(&response.token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, 9);
        assert_eq!(claims.role, Role::PeerMentor);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let mut users = MockUserStore::new();
        users.expect_create_user().returning(|_| Ok(None));

        let result = register(
            &users,
            &config(),
            registration("Ada", "ada@example.com", "secret", "student"),
        )
        .await;

        match result {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "Email already registered"),
            other => panic!("expected duplicate rejection, got {:?}", other),
        }
    }

    fn users_with(email: &'static str, password: &str, is_active: bool) -> MockUserStore {
        let password_hash = hash_password(password).unwrap();
        let mut users = MockUserStore::new();
        users
            .expect_find_credentials_by_email()
            .returning(move |lookup| {
                if lookup == email {
                    Ok(Some(UserCredentials {
                        user: stored_user(3, email, Role::Student, is_active),
                        password_hash: password_hash.clone(),
                    }))
                } else {
                    Ok(None)
                }
            });
        users
    }

    #[tokio::test]
    async fn test_login_success_records_login() {
        let mut users = users_with("ada@example.com", "secret", true);
        users
            .expect_record_login()
            .withf(|user_id| *user_id == 3)
            .times(1)
            .returning(|_| Ok(()));

        let request = LoginRequest {
            email: " ADA@example.com".to_string(),
            password: "secret".to_string(),
        };
        let response = login(&users, &config(), request).await.unwrap();

        assert_eq!(response.message, "Login successful");
        assert_eq!(response.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let mut users = users_with("ada@example.com", "secret", true);
        users.expect_record_login().never();

        let wrong_password = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "guess".to_string(),
        };
        assert!(matches!(
            login(&users, &config(), wrong_password).await,
            Err(AppError::Unauthorized(_))
        ));

        let unknown = LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(matches!(
            login(&users, &config(), unknown).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_account_is_forbidden() {
        let users = users_with("ada@example.com", "secret", false);

        let request = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(matches!(
            login(&users, &config(), request).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
