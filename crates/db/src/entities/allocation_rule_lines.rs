//! `SeaORM` Entity for allocation_rule_lines table.
//!
//! Percentages are stored as basis points (`6000` = 60%).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "allocation_rule_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rule_id: Uuid,
    pub business_unit_id: Uuid,
    pub percentage_bp: i32,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::allocation_rules::Entity",
        from = "Column::RuleId",
        to = "super::allocation_rules::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AllocationRules,
    #[sea_orm(
        belongs_to = "super::business_units::Entity",
        from = "Column::BusinessUnitId",
        to = "super::business_units::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    BusinessUnits,
}

impl Related<super::allocation_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllocationRules.def()
    }
}

impl Related<super::business_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessUnits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
