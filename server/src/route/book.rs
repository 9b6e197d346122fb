use crate::controller::Controller;
use crate::csrf::{self, CSRF_FIELD};
use crate::error::ErrorStatus;
use crate::flash::Flash;
use crate::handler::AppModule;
use crate::request::{
    AddBookRequest, BookTransformer, DeleteBookRequest, FormErrors, GetBookRequest,
    UpdateRatingRequest,
};
use crate::response::{
    AddBookPage, BookPresenter, BookResponse, DeletionPresenter, EditRatingPage, IndexPage, Page,
    RatingPresenter,
};
use application::service::{
    CreateBookService, DeleteBookService, GetBookService, UpdateBookRatingService,
};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use axum_extra::extract::cookie::SignedCookieJar;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/",
            get(
                |State(module): State<AppModule>, jar: SignedCookieJar| async move {
                    let books = Controller::new((), BookPresenter)
                        .bypass(|| module.database().get_all_books())
                        .await?;
                    let (jar, flashes) = Flash::take(jar);
                    Ok::<_, ErrorStatus>((jar, Page(IndexPage::new(books, flashes))))
                },
            ),
        )
        .route(
            "/add",
            get(|jar: SignedCookieJar| async move {
                let (jar, csrf_token) = csrf::issue(jar);
                let form = AddBookRequest::default();
                (jar, Page(AddBookPage::new(form, csrf_token, FormErrors::default())))
            })
            .post(add_book),
        )
        .route(
            "/edit/:book_id",
            get(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 jar: SignedCookieJar| async move {
                    let book = find_book(&module, id).await?;
                    let (jar, csrf_token) = csrf::issue(jar);
                    let errors = FormErrors::default();
                    let page = EditRatingPage::new(book, String::new(), csrf_token, errors);
                    Ok::<_, ErrorStatus>((jar, Page(page)))
                },
            )
            .post(update_rating),
        )
        .route(
            "/delete/:target",
            get(
                |State(module): State<AppModule>,
                 Path(target): Path<String>,
                 jar: SignedCookieJar| async move {
                    let request = DeleteBookRequest::parse(&target).ok_or_else(|| {
                        ErrorStatus::not_found(format!("No book matches {target}"))
                    })?;
                    let flash = Controller::new(BookTransformer, DeletionPresenter)
                        .intake(request)
                        .handle(|dto| module.database().delete_book(dto))
                        .await?;
                    Ok::<_, ErrorStatus>((flash.attach(jar), Redirect::to("/")))
                },
            ),
        )
    }
}

async fn find_book(module: &AppModule, id: i64) -> Result<BookResponse, ErrorStatus> {
    Controller::new(BookTransformer, BookPresenter)
        .intake(GetBookRequest::new(id))
        .handle(|dto| module.database().get_book(dto))
        .await?
        .ok_or_else(|| ErrorStatus::not_found(format!("Book {id} not found")))
}

async fn add_book(
    State(module): State<AppModule>,
    jar: SignedCookieJar,
    Form(req): Form<AddBookRequest>,
) -> Result<Response, ErrorStatus> {
    let checked = csrf::verify(&jar, req.csrf_token());
    let submitted = req.clone();
    match (
        checked,
        Controller::new(BookTransformer, BookPresenter).try_intake(req),
    ) {
        (Ok(()), Ok(transformed)) => {
            let flash = transformed
                .handle(|dto| module.database().create_book(dto))
                .await?;
            Ok((flash.attach(jar), Redirect::to("/")).into_response())
        }
        (checked, transformed) => {
            let mut errors = transformed.err().unwrap_or_default();
            if let Err(message) = checked {
                errors.push(CSRF_FIELD, message);
            }
            let (jar, csrf_token) = csrf::issue(jar);
            let page = AddBookPage::new(submitted, csrf_token, errors);
            Ok((jar, Page(page)).into_response())
        }
    }
}

async fn update_rating(
    State(module): State<AppModule>,
    Path(id): Path<i64>,
    jar: SignedCookieJar,
    Form(req): Form<UpdateRatingRequest>,
) -> Result<Response, ErrorStatus> {
    let book = find_book(&module, id).await?;
    let checked = csrf::verify(&jar, req.csrf_token());
    let submitted = req.new_rating().clone().unwrap_or_default();
    match (
        checked,
        Controller::new(BookTransformer, RatingPresenter).try_intake((id, req)),
    ) {
        (Ok(()), Ok(transformed)) => {
            let flash = transformed
                .handle(|dto| module.database().update_book_rating(dto))
                .await?;
            Ok((flash.attach(jar), Redirect::to("/")).into_response())
        }
        (checked, transformed) => {
            let mut errors = transformed.err().unwrap_or_default();
            if let Err(message) = checked {
                errors.push(CSRF_FIELD, message);
            }
            let (jar, csrf_token) = csrf::issue(jar);
            let page = EditRatingPage::new(book, submitted, csrf_token, errors);
            Ok((jar, Page(page)).into_response())
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use application::service::{GetBookService, UpdateBookRatingService};
    use application::transfer::{BookDto, UpdateBookRatingDto};
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use axum_extra::extract::cookie::Key;
    use driver::database::SqliteDatabase;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::handler::{AppModule, Handler};
    use crate::route::BookRouter;

    struct Reply {
        status: StatusCode,
        location: Option<String>,
        body: String,
    }

    /// Drives the router like a browser would, keeping cookies between requests.
    struct Browser {
        module: AppModule,
        router: Router,
        cookies: BTreeMap<String, String>,
        _dir: TempDir,
    }

    impl Browser {
        async fn open() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let database = SqliteDatabase::open(dir.path().join("library.db"))
                .await
                .unwrap();
            let module = AppModule::with(Handler::new(database, Key::generate()));
            let router = Router::new().route_book().with_state(module.clone());
            Self {
                module,
                router,
                cookies: BTreeMap::new(),
                _dir: dir,
            }
        }

        async fn get(&mut self, uri: &str) -> Reply {
            self.send(Method::GET, uri, None).await
        }

        async fn post(&mut self, uri: &str, form: &str) -> Reply {
            self.send(Method::POST, uri, Some(form.to_string())).await
        }

        async fn send(&mut self, method: Method, uri: &str, form: Option<String>) -> Reply {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let mut request = Request::builder().method(method).uri(uri);
            if !cookie.is_empty() {
                request = request.header(COOKIE, cookie);
            }
            let request = match form {
                Some(form) => request
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form)),
                None => request.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            for header in response.headers().get_all(SET_COOKIE) {
                let pair = header.to_str().unwrap().split(';').next().unwrap();
                let (name, value) = pair.split_once('=').unwrap();
                if value.is_empty() {
                    self.cookies.remove(name);
                } else {
                    self.cookies.insert(name.to_string(), value.to_string());
                }
            }
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .map(|value| value.to_str().unwrap().to_string());
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            Reply {
                status,
                location,
                body: String::from_utf8(body.to_vec()).unwrap(),
            }
        }

        async fn csrf_token(&mut self, form_uri: &str) -> String {
            let page = self.get(form_uri).await;
            assert_eq!(page.status, StatusCode::OK);
            let marker = "name=\"csrf_token\" value=\"";
            let start = page.body.find(marker).expect("form carries a token") + marker.len();
            let end = start + page.body[start..].find('"').unwrap();
            page.body[start..end].to_string()
        }

        async fn add(&mut self, title: &str, author: &str, rating: &str) -> Reply {
            let token = self.csrf_token("/add").await;
            let form = format!("title={title}&author={author}&rating={rating}&csrf_token={token}");
            self.post("/add", &form).await
        }

        async fn edit(&mut self, id: i64, new_rating: &str) -> Reply {
            let uri = format!("/edit/{id}");
            let token = self.csrf_token(&uri).await;
            let form = format!("new_rating={new_rating}&csrf_token={token}");
            self.post(&uri, &form).await
        }

        async fn books(&self) -> Vec<BookDto> {
            self.module.database().get_all_books().await.unwrap()
        }
    }

    fn assert_redirects_home(reply: &Reply) {
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn dune_lifecycle() {
        let mut browser = Browser::open().await;

        let reply = browser.add("Dune", "Frank+Herbert", "9.5").await;
        assert_redirects_home(&reply);
        let books = browser.books().await;
        assert_eq!(books.len(), 1);
        let dune = books[0].clone();
        assert_eq!(dune.title, "Dune");
        assert_eq!(dune.author, "Frank Herbert");
        assert_eq!(dune.rating, 9.5);

        let home = browser.get("/").await;
        assert_eq!(home.status, StatusCode::OK);
        assert!(home.body.contains("Dune - Frank Herbert - 9.5/10"));

        let reply = browser.add("Dune", "Anyone", "3").await;
        assert_redirects_home(&reply);
        assert_eq!(browser.books().await, vec![dune.clone()]);
        let home = browser.get("/").await;
        assert!(home.body.contains("is already in your collection."));

        let reply = browser.edit(dune.id, "7.0").await;
        assert_redirects_home(&reply);
        let home = browser.get("/").await;
        assert!(home.body.contains("Rating updated successfully!"));
        assert!(home.body.contains("Dune - Frank Herbert - 7.0/10"));
        let again = browser.get("/").await;
        assert!(!again.body.contains("Rating updated successfully!"));

        let reply = browser.get(&format!("/delete/id={}", dune.id)).await;
        assert_redirects_home(&reply);
        assert!(browser.books().await.is_empty());
        let home = browser.get("/").await;
        assert!(home.body.contains("deleted successfully!"));
        assert!(home.body.contains("Library is empty."));
    }

    #[tokio::test]
    async fn add_rejects_rating_out_of_range() {
        let mut browser = Browser::open().await;
        for rating in ["0.5", "11", "-1"] {
            let reply = browser.add("Dune", "Frank+Herbert", rating).await;
            assert_eq!(reply.status, StatusCode::OK);
            assert!(reply.body.contains("Rating must be between 1 and 10"));
            assert!(reply.body.contains("value=\"Dune\""));
        }
        assert!(browser.books().await.is_empty());
    }

    #[tokio::test]
    async fn add_requires_every_field() {
        let mut browser = Browser::open().await;
        let reply = browser.add("", "", "").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Enter a book title"));
        assert!(reply.body.contains("Add a valid rating"));
        assert!(browser.books().await.is_empty());
    }

    #[tokio::test]
    async fn add_without_csrf_token_is_refused() {
        let mut browser = Browser::open().await;
        let reply = browser
            .post("/add", "title=Dune&author=Frank+Herbert&rating=9.5")
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("The CSRF token is missing or invalid."));
        assert!(browser.books().await.is_empty());

        browser.csrf_token("/add").await;
        let reply = browser
            .post("/add", "title=Dune&author=Frank+Herbert&rating=9.5&csrf_token=forged")
            .await;
        assert!(reply.body.contains("The CSRF token is missing or invalid."));
        assert!(browser.books().await.is_empty());
    }

    #[tokio::test]
    async fn edit_rejects_rating_out_of_range() {
        let mut browser = Browser::open().await;
        browser.add("Dune", "Frank+Herbert", "9.5").await;
        let dune = browser.books().await[0].clone();

        for rating in ["10.5", "-0.5", "", "abc"] {
            let reply = browser.edit(dune.id, rating).await;
            assert_eq!(reply.status, StatusCode::OK);
            assert!(reply.body.contains("Edit Rating"));
        }
        assert_eq!(browser.books().await, vec![dune.clone()]);

        let reply = browser.edit(dune.id, "0").await;
        assert_redirects_home(&reply);
        assert_eq!(browser.books().await[0].rating, 0.0);
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let mut browser = Browser::open().await;
        for title in ["Dune", "Anathem", "Emma"] {
            browser.add(title, "someone", "5").await;
        }
        let books = browser.books().await;
        let reply = browser.get(&format!("/delete/id={}", books[1].id)).await;
        assert_redirects_home(&reply);
        assert_eq!(
            browser.books().await,
            vec![books[0].clone(), books[2].clone()]
        );
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let mut browser = Browser::open().await;
        assert_eq!(browser.get("/edit/99").await.status, StatusCode::NOT_FOUND);
        let reply = browser.post("/edit/99", "new_rating=5").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.body.contains("Book 99 not found"));
        assert_eq!(browser.get("/delete/id=99").await.status, StatusCode::NOT_FOUND);
        assert_eq!(browser.get("/delete/99").await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rating_is_the_only_field_edited() {
        let mut browser = Browser::open().await;
        browser.add("Dune", "Frank+Herbert", "9.5").await;
        let dune = browser.books().await[0].clone();

        let updated = browser
            .module
            .database()
            .update_book_rating(UpdateBookRatingDto {
                id: dune.id,
                rating: 2.5,
            })
            .await
            .unwrap();
        assert_eq!(updated, BookDto { rating: 2.5, ..dune });
    }
}
