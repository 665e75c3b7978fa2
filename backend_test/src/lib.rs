use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Each test gets its own server over a fresh in-memory election store, with
/// a manually driven clock that starts while candidate registration is open.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// [`crate::model::common::clock::ManualClock`] (a handle to the server's
/// clock). Pass `admin` or `voter` to start the client logged in.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin/voter if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! {
            let response = rocket_client
                .post("/auth/admin/login")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::auth::AdminLoginRequest::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok, "admin login failed");
        },
        Some(arg) if arg == "voter" => quote! {
            let response = rocket_client
                .post("/auth/voter/login")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::auth::VoterLoginRequest::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok, "voter login failed");
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or `voter`")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (rocket::local::asynchronous::Client, crate::model::common::clock::ManualClock) {
                let clock = crate::model::common::clock::ManualClock::new(
                    crate::model::common::phase::Timeline::example_time_in(
                        crate::model::common::phase::Phase::RegistrationOpen,
                    ),
                );
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::rocket_for_test(clock.clone()))
                    .await
                    .unwrap();

                // The login response must be dropped before the client is returned.
                {
                    #maybe_login
                }

                (rocket_client, clock)
            }

            /// The test itself.
            #item_fn

            // Rocket's local client must be driven from a multi-threaded runtime.
            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                #[allow(unused_variables)]
                let (rocket_client, clock) = setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_clock = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "ManualClock" {
                    if has_clock {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `ManualClock`",
                        ));
                    }
                    has_clock = true;
                    args.push(quote! { clock });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `clock_ident: ManualClock`",
        ));
    }

    Ok(args)
}
