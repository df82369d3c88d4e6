use super::types::{IdentityClaim, OAuthProfile, Provider};
use crate::features::users::helpers::normalize_email;
use crate::features::users::{AuthProvider, NewUser, User, UserStore};
use crate::utils::error::{Error, Result};

/// Find-or-create/merge for an external-provider profile.
///
/// Precedence: provider id first, then email. A returning OAuth user is
/// recognized even after changing display name, and an email that already
/// belongs to a local account gets the provider id attached instead of a
/// duplicate record. A lost create race degrades into the same read-then-link.
pub async fn resolve_oauth_profile(
    store: &dyn UserStore,
    profile: &OAuthProfile,
) -> Result<User> {
    let email = profile.email.as_deref().map(normalize_email);

    if let Some(user) =
        lookup(store, IdentityClaim::ProviderId(profile.provider, &profile.provider_id)).await?
    {
        return Ok(user);
    }

    if let Some(email) = &email {
        if let Some(user) = lookup(store, IdentityClaim::Email(email)).await? {
            return link(store, user, profile).await;
        }
    }

    match store.create(new_user_from_profile(profile, email.clone())).await {
        Ok(user) => Ok(user),
        Err(Error::Conflict(_)) => {
            // A concurrent writer beat us to one of the keys; re-resolve.
            if let Some(user) = lookup(
                store,
                IdentityClaim::ProviderId(profile.provider, &profile.provider_id),
            )
            .await?
            {
                return Ok(user);
            }
            if let Some(email) = &email {
                if let Some(user) = lookup(store, IdentityClaim::Email(email)).await? {
                    return link(store, user, profile).await;
                }
            }
            Err(Error::Conflict("could not resolve oauth identity".into()))
        }
        Err(e) => Err(e),
    }
}

async fn lookup(store: &dyn UserStore, claim: IdentityClaim<'_>) -> Result<Option<User>> {
    match claim {
        IdentityClaim::ProviderId(Provider::Google, id) => store.find_by_google_id(id).await,
        IdentityClaim::ProviderId(Provider::Facebook, id) => store.find_by_facebook_id(id).await,
        IdentityClaim::Email(email) => store.find_by_email(email).await,
        IdentityClaim::Phone(phone) => store.find_by_phone(phone).await,
    }
}

/// Attach the provider id to an existing record. Name and avatar are
/// backfilled only when currently empty; user-set values stay untouched,
/// and so does `auth_provider`, which keeps naming the creating channel.
async fn link(store: &dyn UserStore, mut user: User, profile: &OAuthProfile) -> Result<User> {
    match profile.provider {
        Provider::Google => user.google_id = Some(profile.provider_id.clone()),
        Provider::Facebook => user.facebook_id = Some(profile.provider_id.clone()),
    }
    if user.name.trim().is_empty() {
        user.name = profile.name.clone();
    }
    if user.avatar.is_none() {
        user.avatar = profile.avatar.clone();
    }
    store.save(&user).await
}

fn new_user_from_profile(profile: &OAuthProfile, email: Option<String>) -> NewUser {
    let (google_id, facebook_id, auth_provider) = match profile.provider {
        Provider::Google => (
            Some(profile.provider_id.clone()),
            None,
            AuthProvider::Google,
        ),
        Provider::Facebook => (
            None,
            Some(profile.provider_id.clone()),
            AuthProvider::Facebook,
        ),
    };
    NewUser {
        name: profile.name.clone(),
        email,
        google_id,
        facebook_id,
        auth_provider,
        avatar: profile.avatar.clone(),
        ..NewUser::default()
    }
}
