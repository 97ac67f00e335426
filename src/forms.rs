//! Input validation shared by the modal forms and the controllers.
//!
//! Every validator trims its input and returns the cleaned value, or a message
//! suitable for showing next to the form.

use crate::api::SongDraft;
use crate::utils::normalize_email;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_playlist_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Playlist name is required".to_string());
    }
    Ok(name.to_string())
}

pub fn validate_song(draft: &SongDraft) -> Result<SongDraft, String> {
    let title = draft.title.trim();
    let artist = draft.artist.trim();
    let url = draft.url.trim();

    let missing: Vec<&str> = [("title", title), ("artist", artist), ("URL", url)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| label)
        .collect();
    if !missing.is_empty() {
        return Err(format!("Song {} required", join_labels(&missing)));
    }

    Ok(SongDraft::new(title, artist, url))
}

pub fn validate_email(email: &str) -> Result<String, String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err("Enter a valid email address".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// `signing_up` additionally requires a display name.
pub fn validate_credentials(
    name: &str,
    email: &str,
    password: &str,
    signing_up: bool,
) -> Result<Credentials, String> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let name = if signing_up {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Some(name.to_string())
    } else {
        None
    };

    Ok(Credentials {
        name,
        email,
        password: password.to_string(),
    })
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [one] => format!("{one} is"),
        [first, second] => format!("{first} and {second} are"),
        _ => {
            let (last, rest) = labels.split_last().unwrap_or((&"", &[]));
            format!("{}, and {last} are", rest.join(", "))
        }
    }
}
