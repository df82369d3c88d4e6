use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::{
    error::Error as StdError,
    fmt::{self},
};

#[derive(Debug)]
pub enum Error {
    NotFound,
    Validation(String),
    Conflict(String),
    InvalidCredentials,
    OAuthOnlyAccount,
    Unauthorized,
    TokenExpired,
    CodeExpired,
    CodeMismatch,
    InvalidOrExpired,
    AlreadyVerified,
    Notifier(String),
    Db(sqlx::Error),
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "not found"),
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::Conflict(msg) => write!(f, "conflict: {msg}"),
            Error::InvalidCredentials => write!(f, "invalid credentials"),
            Error::OAuthOnlyAccount => {
                write!(f, "please login using your OAuth provider (Google/Facebook)")
            }
            Error::Unauthorized => write!(f, "unauthorized"),
            Error::TokenExpired => write!(f, "token expired"),
            Error::CodeExpired => write!(f, "code expired, request a new one"),
            Error::CodeMismatch => write!(f, "incorrect code"),
            Error::InvalidOrExpired => write!(f, "invalid or expired verification token"),
            Error::AlreadyVerified => write!(f, "this email is already verified"),
            Error::Notifier(msg) => write!(f, "notifier failure: {msg}"),
            Error::Db(e) => write!(f, "database error: {e}"),
            Error::Unexpected(msg) => write!(f, "unexpected error: {msg}"),
        }
    }
}

impl StdError for Error {}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Error::NotFound,
            other => Error::Db(other),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Unexpected(format!("http error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("serde json error: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Validation(_)
            | Error::CodeExpired
            | Error::CodeMismatch
            | Error::InvalidOrExpired
            | Error::AlreadyVerified => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InvalidCredentials
            | Error::OAuthOnlyAccount
            | Error::Unauthorized
            | Error::TokenExpired => StatusCode::UNAUTHORIZED,
            Error::Notifier(_) | Error::Db(_) | Error::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            Error::NotFound => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Conflict(_) => "DUPLICATE_KEY",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::OAuthOnlyAccount => "OAUTH_ONLY_ACCOUNT",
            Error::Unauthorized => "UNAUTHORIZED",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::CodeExpired => "CODE_EXPIRED",
            Error::CodeMismatch => "CODE_MISMATCH",
            Error::InvalidOrExpired => "INVALID_OR_EXPIRED",
            Error::AlreadyVerified => "ALREADY_VERIFIED",
            Error::Notifier(_) => "NOTIFIER_FAILURE",
            Error::Db(_) => "DB_ERROR",
            Error::Unexpected(_) => "UNEXPECTED",
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
