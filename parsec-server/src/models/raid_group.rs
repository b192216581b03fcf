use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::raid_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RaidGroup {
    pub id: i32,
    pub name: String,
    pub password: String,
    pub admin_password: String,
    pub created_at: NaiveDateTime,
}
