use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub password_salt: String,
    #[sea_orm(unique)]
    pub token_hash: Option<String>,
    pub xp: i32,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_on: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub last_seen_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attempts::Entity")]
    Attempts,
    #[sea_orm(has_many = "super::xp_events::Entity")]
    XpEvents,
}

impl Related<super::attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempts.def()
    }
}

impl Related<super::xp_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::XpEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
