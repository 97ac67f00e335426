mod home;
mod login;
mod playlist_detail;

pub use home::HomeView;
pub use login::LoginView;
pub use playlist_detail::PlaylistDetailView;
