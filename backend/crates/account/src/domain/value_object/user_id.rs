use kernel::id::Id;

pub struct UserMarker;

/// Account identifier, a time-ordered UUIDv7
pub type UserId = Id<UserMarker>;
