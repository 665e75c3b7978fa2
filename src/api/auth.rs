use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    election::Election,
    error::{Error, Result},
    model::{
        api::auth::{AdminLoginRequest, AuthToken, Authenticator, VoterLoginRequest, AUTH_TOKEN_COOKIE},
        db::voter::Voter,
    },
};

pub fn routes() -> Vec<Route> {
    routes![voter_login, admin_login, logout]
}

#[post("/auth/voter/login", data = "<request>", format = "json")]
async fn voter_login(
    request: Json<VoterLoginRequest>,
    cookies: &CookieJar<'_>,
    authenticator: &State<Box<dyn Authenticator>>,
    election: &State<Election>,
    config: &State<Config>,
) -> Result<Json<Voter>> {
    let voter_id = authenticator.authenticate(&request)?;

    // First contact creates the voter's record.
    let voter = election.admit_voter(&voter_id).await?;

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config)?);
    info!("Voter {voter_id} logged in");

    Ok(Json(voter))
}

#[post("/auth/admin/login", data = "<request>", format = "json")]
async fn admin_login(
    request: Json<AdminLoginRequest>,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
) -> Result<()> {
    let admin = config.admin();
    if !admin.verify_password(&request.password)? {
        return Err(Error::unauthorized("incorrect admin password"));
    }

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config)?);
    info!("Admin logged in");

    Ok(())
}

#[delete("/auth")]
fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::Client,
        serde::json::{json, serde_json},
    };

    use super::*;

    #[backend_test]
    async fn voter_login_creates_voter(client: Client) {
        let response = client
            .post(uri!(voter_login))
            .header(ContentType::JSON)
            .body(json!(VoterLoginRequest::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let voter: Voter =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(voter, Voter::new(VoterLoginRequest::example().roll_number));

        let election = client.rocket().state::<Election>().unwrap();
        assert!(election
            .voter(&VoterLoginRequest::example().roll_number)
            .await
            .unwrap()
            .is_some());
    }

    #[backend_test]
    async fn voter_login_invalid_roll_number(client: Client) {
        for roll_number in ["", "12345", "1234567", "abcdef"] {
            let response = client
                .post(uri!(voter_login))
                .header(ContentType::JSON)
                .body(json!({ "roll_number": roll_number }).to_string())
                .dispatch()
                .await;

            assert_eq!(Status::Unauthorized, response.status());
            assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
        }
    }

    #[backend_test]
    async fn admin_login_valid(client: Client) {
        let response = client
            .post(uri!(admin_login))
            .header(ContentType::JSON)
            .body(json!(AdminLoginRequest::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn admin_login_invalid(client: Client) {
        let response = client
            .post(uri!(admin_login))
            .header(ContentType::JSON)
            .body(json!({ "password": "" }).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(admin)]
    async fn logout_admin(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(voter)]
    async fn logout_voter(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
