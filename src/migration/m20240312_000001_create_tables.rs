use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null().unique_key())
                    .col(ColumnDef::new(Posts::Subtitle).string().not_null())
                    .col(ColumnDef::new(Posts::Date).string().not_null())
                    .col(ColumnDef::new(Posts::Body).text().not_null())
                    .col(ColumnDef::new(Posts::ImgUrl).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Comments go away with their post.
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comments::PostId).integer().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post")
                            .from(Comments::Table, Comments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Catches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Catches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Catches::Date).string().not_null())
                    .col(ColumnDef::new(Catches::Time).string().not_null())
                    .col(ColumnDef::new(Catches::Location).string().not_null())
                    .col(ColumnDef::new(Catches::Species).string().not_null())
                    .col(ColumnDef::new(Catches::Size).string().not_null())
                    .col(ColumnDef::new(Catches::Method).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Weather::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Weather::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Weather::Date).string().not_null())
                    .col(ColumnDef::new(Weather::Longitude).string().not_null())
                    .col(ColumnDef::new(Weather::Latitude).string().not_null())
                    .col(ColumnDef::new(Weather::AirTemperature).double().not_null())
                    .col(ColumnDef::new(Weather::WaterTemperature).double().not_null())
                    .col(ColumnDef::new(Weather::WindSpeed).double().not_null())
                    .col(ColumnDef::new(Weather::WindDirection).string().not_null())
                    .col(ColumnDef::new(Weather::SwellHeight).double().not_null())
                    .col(ColumnDef::new(Weather::SwellPeriod).double().not_null())
                    .col(ColumnDef::new(Weather::SwellDirection).string().not_null())
                    .col(ColumnDef::new(Weather::CurrentDirection).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Spots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Spots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Spots::Name).string().not_null())
                    .col(ColumnDef::new(Spots::Date).string().not_null())
                    .col(ColumnDef::new(Spots::Longitude).string().not_null())
                    .col(ColumnDef::new(Spots::Latitude).string().not_null())
                    .col(ColumnDef::new(Spots::SpotInfo).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Spots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Weather::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Catches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    IsAdmin,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
    AuthorId,
    Title,
    Subtitle,
    Date,
    Body,
    ImgUrl,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    PostId,
    AuthorId,
    Text,
}

#[derive(Iden)]
enum Catches {
    Table,
    Id,
    Date,
    Time,
    Location,
    Species,
    Size,
    Method,
}

#[derive(Iden)]
enum Weather {
    Table,
    Id,
    Date,
    Longitude,
    Latitude,
    AirTemperature,
    WaterTemperature,
    WindSpeed,
    WindDirection,
    SwellHeight,
    SwellPeriod,
    SwellDirection,
    CurrentDirection,
}

#[derive(Iden)]
enum Spots {
    Table,
    Id,
    Name,
    Date,
    Longitude,
    Latitude,
    SpotInfo,
}
