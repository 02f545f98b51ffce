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
                    .col(id_col(Users::Id))
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null().unique_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(Users::FirstName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::Password).string_len(128).not_null())
                    .col(ColumnDef::new(Users::Avatar).string().null())
                    .col(
                        ColumnDef::new(Users::DateJoined)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthTokens::Key)
                            .string_len(40)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthTokens::UserId).integer().not_null().unique_key())
                    .col(
                        ColumnDef::new(AuthTokens::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_auth_tokens_user",
                        AuthTokens::Table,
                        AuthTokens::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingredients::Table)
                    .if_not_exists()
                    .col(id_col(Ingredients::Id))
                    .col(ColumnDef::new(Ingredients::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Ingredients::MeasurementUnit)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Ingredients::SearchName).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ingredients_search_name")
                    .table(Ingredients::Table)
                    .col(Ingredients::SearchName)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_pair(
                "uq_ingredients_name_unit",
                Ingredients::Table,
                Ingredients::Name,
                Ingredients::MeasurementUnit,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(id_col(Recipes::Id))
                    .col(ColumnDef::new(Recipes::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Recipes::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Recipes::Image).string().not_null())
                    .col(ColumnDef::new(Recipes::Text).text().not_null())
                    .col(ColumnDef::new(Recipes::CookingTime).integer().not_null())
                    .col(
                        ColumnDef::new(Recipes::PubDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_recipes_author",
                        Recipes::Table,
                        Recipes::AuthorId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_recipes_pub_date")
                    .table(Recipes::Table)
                    .col(Recipes::PubDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(id_col(RecipeIngredients::Id))
                    .col(ColumnDef::new(RecipeIngredients::RecipeId).integer().not_null())
                    .col(
                        ColumnDef::new(RecipeIngredients::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeIngredients::Amount).integer().not_null())
                    .foreign_key(&mut cascade_fk(
                        "fk_recipe_ingredients_recipe",
                        RecipeIngredients::Table,
                        RecipeIngredients::RecipeId,
                        Recipes::Table,
                        Recipes::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_recipe_ingredients_ingredient",
                        RecipeIngredients::Table,
                        RecipeIngredients::IngredientId,
                        Ingredients::Table,
                        Ingredients::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_pair(
                "uq_recipe_ingredients_recipe_ingredient",
                RecipeIngredients::Table,
                RecipeIngredients::RecipeId,
                RecipeIngredients::IngredientId,
            ))
            .await?;

        for (table, fk_user, fk_recipe, uq) in [
            (
                Favorites::Table,
                "fk_favorites_user",
                "fk_favorites_recipe",
                "uq_favorites_user_recipe",
            ),
            (
                Favorites::ShopCarts,
                "fk_shop_carts_user",
                "fk_shop_carts_recipe",
                "uq_shop_carts_user_recipe",
            ),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(id_col(Favorites::Id))
                        .col(ColumnDef::new(Favorites::UserId).integer().not_null())
                        .col(ColumnDef::new(Favorites::RecipeId).integer().not_null())
                        .foreign_key(&mut cascade_fk(
                            fk_user,
                            table,
                            Favorites::UserId,
                            Users::Table,
                            Users::Id,
                        ))
                        .foreign_key(&mut cascade_fk(
                            fk_recipe,
                            table,
                            Favorites::RecipeId,
                            Recipes::Table,
                            Recipes::Id,
                        ))
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(unique_pair(uq, table, Favorites::UserId, Favorites::RecipeId))
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(id_col(Subscriptions::Id))
                    .col(ColumnDef::new(Subscriptions::UserId).integer().not_null())
                    .col(ColumnDef::new(Subscriptions::AuthorId).integer().not_null())
                    .foreign_key(&mut cascade_fk(
                        "fk_subscriptions_user",
                        Subscriptions::Table,
                        Subscriptions::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_subscriptions_author",
                        Subscriptions::Table,
                        Subscriptions::AuthorId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_pair(
                "uq_subscriptions_user_author",
                Subscriptions::Table,
                Subscriptions::UserId,
                Subscriptions::AuthorId,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Subscriptions::Table.into_iden(),
            Favorites::ShopCarts.into_iden(),
            Favorites::Table.into_iden(),
            RecipeIngredients::Table.into_iden(),
            Recipes::Table.into_iden(),
            Ingredients::Table.into_iden(),
            AuthTokens::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn cascade_fk<T, C, R, RC>(
    name: &str,
    table: T,
    col: C,
    ref_table: R,
    ref_col: RC,
) -> ForeignKeyCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden,
    R: IntoIden + 'static,
    RC: IntoIden,
{
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(ref_table, ref_col)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn unique_pair<T, A, B>(name: &str, table: T, a: A, b: B) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    A: IntoIden,
    B: IntoIden,
{
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(a)
        .col(b)
        .unique()
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    Password,
    Avatar,
    DateJoined,
}

#[derive(DeriveIden)]
enum AuthTokens {
    Table,
    Key,
    UserId,
    Created,
}

#[derive(DeriveIden)]
enum Ingredients {
    Table,
    Id,
    Name,
    MeasurementUnit,
    /// Unicode-lowercased `name`; SQLite's `lower()` only folds ASCII.
    SearchName,
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    Id,
    AuthorId,
    Name,
    Image,
    Text,
    CookingTime,
    PubDate,
}

#[derive(DeriveIden)]
enum RecipeIngredients {
    Table,
    Id,
    RecipeId,
    IngredientId,
    Amount,
}

/// Favorites and shopping carts share one layout.
#[derive(Clone, Copy, DeriveIden)]
enum Favorites {
    Table,
    #[sea_orm(iden = "shop_carts")]
    ShopCarts,
    Id,
    UserId,
    RecipeId,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    AuthorId,
}
