use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tracks table
        manager
            .create_table(
                Table::create()
                    .table(Track::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Track::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Track::Title).string().not_null())
                    .col(ColumnDef::new(Track::Album).string().not_null())
                    .col(ColumnDef::new(Track::Artist).string().not_null())
                    .col(
                        ColumnDef::new(Track::FilePath)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Track::PlexGuid).string())
                    .col(ColumnDef::new(Track::PlexRatingkey).big_integer())
                    .col(ColumnDef::new(Track::PlexUserrating).double())
                    .col(ColumnDef::new(Track::PlexSkipcount).big_integer())
                    .col(ColumnDef::new(Track::PlexViewcount).big_integer())
                    .col(ColumnDef::new(Track::PlexLastviewedat).big_integer())
                    .col(ColumnDef::new(Track::PlexLastratedat).big_integer())
                    .col(ColumnDef::new(Track::PlexUpdated).big_integer())
                    .col(
                        ColumnDef::new(Track::CreatedAt)
                            .big_integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .col(
                        ColumnDef::new(Track::UpdatedAt)
                            .big_integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracks_plex_ratingkey")
                    .table(Track::Table)
                    .col(Track::PlexRatingkey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracks_file_path")
                    .table(Track::Table)
                    .col(Track::FilePath)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Track::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Track {
    #[sea_orm(iden = "tracks")]
    Table,
    Id,
    Title,
    Album,
    Artist,
    FilePath,
    PlexGuid,
    PlexRatingkey,
    PlexUserrating,
    PlexSkipcount,
    PlexViewcount,
    PlexLastviewedat,
    PlexLastratedat,
    PlexUpdated,
    CreatedAt,
    UpdatedAt,
}
