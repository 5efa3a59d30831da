use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub google_client_id: String,
    pub trainer_invitation_code: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            // HMAC only; the signing secret is a shared symmetric key.
            algorithm: match std::env::var("JWT_ALGORITHM").ok().as_deref() {
                None | Some("HS256") => Algorithm::HS256,
                Some("HS384") => Algorithm::HS384,
                Some("HS512") => Algorithm::HS512,
                Some(other) => anyhow::bail!("unsupported JWT_ALGORITHM: {other}"),
            },
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        let google_client_id = std::env::var("GOOGLE_CLIENT_ID")?;
        let trainer_invitation_code = std::env::var("TRAINER_INVITATION_CODE").ok();
        Ok(Self {
            database_url,
            jwt,
            google_client_id,
            trainer_invitation_code,
        })
    }
}
