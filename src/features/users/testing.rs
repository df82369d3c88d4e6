//! In-memory doubles for service-level tests: a `UserStore` with the same
//! uniqueness semantics as the Postgres store, and recording notifiers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::db::{NewUser, User};
use super::repo::UserStore;
use crate::features::clients::{Mailer, SmsSender};
use crate::utils::error::{Error, Result};

#[derive(Default)]
struct State {
    seq: i64,
    rows: Vec<User>,
}

#[derive(Default)]
pub struct InMemoryUsers {
    inner: Mutex<State>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    /// Direct row mutation, for backdating expiries in tests.
    pub fn modify<F: FnOnce(&mut User)>(&self, id: i64, f: F) {
        let mut state = self.inner.lock().unwrap();
        let row = state
            .rows
            .iter_mut()
            .find(|u| u.id == id)
            .expect("no such user in test store");
        f(row);
    }
}

fn collides(rows: &[User], candidate: &User) -> bool {
    rows.iter().filter(|u| u.id != candidate.id).any(|u| {
        same_key(&u.email, &candidate.email)
            || same_key(&u.phone, &candidate.phone)
            || same_key(&u.google_id, &candidate.google_id)
            || same_key(&u.facebook_id, &candidate.facebook_id)
    })
}

fn same_key(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_facebook_id(&self, facebook_id: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| u.facebook_id.as_deref() == Some(facebook_id))
            .cloned())
    }

    async fn find_by_verification_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|u| {
                u.email_verification_token_hash.as_deref() == Some(token_hash)
                    && u.email_verification_expiry.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        let mut state = self.inner.lock().unwrap();
        state.seq += 1;
        let now = Utc::now();
        let user = User {
            id: state.seq,
            name: new.name,
            email: new.email,
            phone: new.phone,
            password_hash: new.password_hash,
            google_id: new.google_id,
            facebook_id: new.facebook_id,
            auth_provider: new.auth_provider,
            role: new.role,
            email_verified: new.email_verified,
            phone_verified: new.phone_verified,
            is_verified: false,
            verification_status: new.verification_status,
            otp: new.otp,
            otp_expiry: new.otp_expiry,
            email_verification_token_hash: new.email_verification_token_hash,
            email_verification_expiry: new.email_verification_expiry,
            rating: 0.0,
            review_count: 0,
            avatar: new.avatar,
            created_at: now,
            updated_at: now,
        };
        if collides(&state.rows, &user) {
            return Err(Error::Conflict(
                "user with this identity key already exists".into(),
            ));
        }
        state.rows.push(user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<User> {
        let mut state = self.inner.lock().unwrap();
        if collides(&state.rows, user) {
            return Err(Error::Conflict(
                "user with this identity key already exists".into(),
            ));
        }
        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        let row = state
            .rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(Error::NotFound)?;
        *row = updated.clone();
        Ok(updated)
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.fail.store(true, Ordering::SeqCst);
        mailer
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text: Option<&str>,
        html: Option<&str>,
    ) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Notifier("mailer down".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.map(str::to_string),
            html: html.map(str::to_string),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingSms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sms = Self::default();
        sms.fail.store(true, Ordering::SeqCst);
        sms
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, to_phone: &str, body: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Notifier("sms gateway down".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to_phone.to_string(), body.to_string()));
        Ok(())
    }
}
