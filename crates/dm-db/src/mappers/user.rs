//! User model -> entity mapper

use dm_core::entities::User;
use dm_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            full_name: model.full_name,
            profile_image: model.profile_image,
        }
    }
}
