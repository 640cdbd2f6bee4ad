#![allow(dead_code)]

use super::*;

table! {
    users (id) {
        id -> Integer,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = users)]
struct UserPrivate {
    id: i32,
    email: String,
    password_hash: String,
    role: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct UserPrivateNew {
    email: String,
    password_hash: String,
    role: String,
    name: String,
}

fn private_to_public(p: UserPrivate) -> Result<(UserRecord, String), String> {
    use conversions::*;
    Ok((
        UserRecord {
            user_id: i32_to_u32(p.id)?,
            email: p.email,
            name: p.name,
            role: deserialize_role(p.role)?,
            created_at: p.created_at,
        },
        p.password_hash,
    ))
}

fn build_new_row(user: NewUser) -> UserPrivateNew {
    use conversions::*;
    UserPrivateNew {
        email: user.email,
        password_hash: user.password_hash,
        role: serialize_role(user.role),
        name: user.name,
    }
}

/// Insert a new user. Returns Ok(None) if the email is already registered.
pub fn insert_user(conn: &mut PgConnection, user: NewUser) -> Result<Option<UserRecord>, String> {
    use self::users::dsl::*;

    let insert_row = build_new_row(user);

    diesel::insert_into(users)
        .values(&insert_row)
        .on_conflict(email)
        .do_nothing()
        .get_result::<UserPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(|(u, _)| Some(u))))
}

pub fn get_user_by_id(conn: &mut PgConnection, row_id: u32) -> Result<Option<UserRecord>, String> {
    use self::users::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    users
        .filter(id.eq(row_id))
        .first::<UserPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(|(u, _)| Some(u))))
}

/// Look up a user and their password hash for login.
pub fn get_user_credentials_by_email(
    conn: &mut PgConnection,
    input_email: &str,
) -> Result<Option<(UserRecord, String)>, String> {
    use self::users::dsl::*;

    users
        .filter(email.eq(input_email))
        .first::<UserPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())
        .and_then(|opt| opt.map_or(Ok(None), |rec| private_to_public(rec).map(Some)))
}
