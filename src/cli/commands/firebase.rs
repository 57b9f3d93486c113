use clap::{Arg, Command};

pub const ARG_API_KEY: &str = "firebase-api-key";
pub const ARG_AUTH_DOMAIN: &str = "firebase-auth-domain";
pub const ARG_DATABASE_URL: &str = "firebase-database-url";
pub const ARG_PROJECT_ID: &str = "firebase-project-id";
pub const ARG_STORAGE_BUCKET: &str = "firebase-storage-bucket";
pub const ARG_MESSAGING_SENDER_ID: &str = "firebase-messaging-sender-id";
pub const ARG_APP_ID: &str = "firebase-app-id";
pub const ARG_MEASUREMENT_ID: &str = "firebase-measurement-id";
pub const ARG_IDENTITY_ENDPOINT: &str = "firebase-identity-endpoint";
pub const ARG_FIRESTORE_ENDPOINT: &str = "firebase-firestore-endpoint";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_KEY)
                .long(ARG_API_KEY)
                .help("Firebase web API key")
                .env("IZZ_FIREBASE_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_AUTH_DOMAIN)
                .long(ARG_AUTH_DOMAIN)
                .help("Firebase auth domain, example: izz.firebaseapp.com")
                .env("IZZ_FIREBASE_AUTH_DOMAIN"),
        )
        .arg(
            Arg::new(ARG_DATABASE_URL)
                .long(ARG_DATABASE_URL)
                .help("Firebase realtime database URL")
                .env("IZZ_FIREBASE_DATABASE_URL"),
        )
        .arg(
            Arg::new(ARG_PROJECT_ID)
                .long(ARG_PROJECT_ID)
                .help("Firebase project id")
                .env("IZZ_FIREBASE_PROJECT_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_STORAGE_BUCKET)
                .long(ARG_STORAGE_BUCKET)
                .help("Firebase storage bucket")
                .env("IZZ_FIREBASE_STORAGE_BUCKET"),
        )
        .arg(
            Arg::new(ARG_MESSAGING_SENDER_ID)
                .long(ARG_MESSAGING_SENDER_ID)
                .help("Firebase messaging sender id")
                .env("IZZ_FIREBASE_MESSAGING_SENDER_ID"),
        )
        .arg(
            Arg::new(ARG_APP_ID)
                .long(ARG_APP_ID)
                .help("Firebase app id")
                .env("IZZ_FIREBASE_APP_ID"),
        )
        .arg(
            Arg::new(ARG_MEASUREMENT_ID)
                .long(ARG_MEASUREMENT_ID)
                .help("Firebase analytics measurement id")
                .env("IZZ_FIREBASE_MEASUREMENT_ID"),
        )
        .arg(
            Arg::new(ARG_IDENTITY_ENDPOINT)
                .long(ARG_IDENTITY_ENDPOINT)
                .help("Identity Toolkit base URL (emulators and tests)")
                .env("IZZ_FIREBASE_IDENTITY_ENDPOINT")
                .default_value(crate::firebase::DEFAULT_IDENTITY_ENDPOINT),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_ENDPOINT)
                .long(ARG_FIRESTORE_ENDPOINT)
                .help("Firestore base URL (emulators and tests)")
                .env("IZZ_FIREBASE_FIRESTORE_ENDPOINT")
                .default_value(crate::firebase::DEFAULT_FIRESTORE_ENDPOINT),
        )
}
