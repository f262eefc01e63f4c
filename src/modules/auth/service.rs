use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::access::identity::Role;
use crate::config::jwt::JwtConfig;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{LoginRequest, LoginResponse, RegisterRequestDto, User};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto))]
    pub async fn register_user(db: &PgPool, dto: RegisterRequestDto) -> Result<User, AppError> {
        if matches!(dto.role, Role::Admin | Role::Principal) {
            return Err(AppError::forbidden(
                "Staff accounts cannot be self-registered",
            ));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (full_name, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, full_name, email, role, created_at, updated_at",
        )
        .bind(&dto.full_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "User with email {} already exists",
                        dto.email
                    ));
                }
            }
            AppError::database(e)
        })?;

        Ok(user)
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            full_name: String,
            email: String,
            role: Role,
            password: String,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        }

        let record = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, full_name, email, role, password, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !verify_password(&dto.password, &record.password)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let access_token = create_access_token(record.id, record.role, jwt_config)?;

        Ok(LoginResponse {
            access_token,
            user: User {
                id: record.id,
                full_name: record.full_name,
                email: record.email,
                role: record.role,
                created_at: record.created_at,
                updated_at: record.updated_at,
            },
        })
    }
}
