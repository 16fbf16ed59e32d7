use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::{fs, io};

use anyhow::Result;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use serde::Deserialize;
use spdlog::{error, info, warn};

use crate::config::{Config, Secrets};
use crate::post::{assemble_post, NewPostFields, PostId, SubmitAction};
use crate::query::{apply_filter, sort_newest_first, title_options};
use crate::query_string::QueryString;
use crate::session::{self, Event, SessionMap};
use crate::store::{open_store, PostStore};
use crate::view::home_renderer::{HomeRenderer, HomeView};
use crate::view::post_renderer::{MissingRenderer, PostRenderer};
use crate::view::rss_renderer::RssChannel;

struct ServerState {
    config: Config,
    admin_password: String,
    store: Arc<dyn PostStore>,
    sessions: SessionMap,
}

/// The session id from the request cookie, or a fresh one plus the
/// `Set-Cookie` value the response must carry.
fn session_of(req: &HttpRequest) -> (String, Option<String>) {
    let existing = req.headers().get("cookie")
        .and_then(|value| value.to_str().ok())
        .and_then(session::session_id_from_cookies);

    match existing {
        Some(sid) => (sid, None),
        None => {
            let sid = SessionMap::fresh_id();
            let cookie = session::session_cookie(&sid);
            (sid, Some(cookie))
        }
    }
}

fn html_response(body: String, set_cookie: Option<String>) -> web::HttpResponse {
    let mut resp = web::HttpResponse::Ok();
    resp.content_type("text/html; charset=utf-8");
    if let Some(cookie) = set_cookie {
        resp.header("Set-Cookie", cookie);
    }
    resp.body(body)
}

fn redirect_home(set_cookie: Option<String>) -> web::HttpResponse {
    let mut resp = web::HttpResponse::SeeOther();
    resp.header("Location", "/");
    if let Some(cookie) = set_cookie {
        resp.header("Set-Cookie", cookie);
    }
    resp.finish()
}

fn read_template(tpl_dir: &PathBuf, file_name: &str) -> io::Result<String> {
    fs::read_to_string(tpl_dir.join(file_name))
}

#[web::get("/")]
async fn home(req: HttpRequest, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let mut session = state.sessions.get(&sid);

    // The filter form submits back to "/" as query parameters
    if let Some(query_str) = req.uri().query() {
        let qs = QueryString::from(query_str);
        if qs.has_filter() {
            session = session::apply(&session, Event::SetFilter(qs.get_filter()), &state.admin_password);
        }
    }
    session = session::apply(&session, Event::GoHome, &state.admin_password);

    let mut posts = match state.store.fetch(session.include_drafts()).await {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error fetching posts: {}", e);
            return web::HttpResponse::InternalServerError()
                .body("Error loading posts");
        }
    };
    sort_newest_first(&mut posts);
    let titles = title_options(&posts);
    let posts = apply_filter(posts, &session.filter);

    let tpl_src = match read_template(&state.config.paths.template_dir, "home.tpl") {
        Ok(src) => src,
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("Error loading home template: {}", e)),
    };
    let renderer = match HomeRenderer::new(&tpl_src) {
        Ok(renderer) => renderer,
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("{}", e)),
    };

    let filter = session.filter.clone();
    let rendered = renderer.render(&HomeView {
        journal_title: state.config.journal.title.as_str(),
        tagline: state.config.journal.tagline.as_str(),
        is_admin: session.is_admin,
        show_drafts: session.show_drafts,
        login_failed: session.login_failed,
        filter: &filter,
        titles,
        posts: &posts,
    });

    // The login error is a one-shot flash
    session.login_failed = false;
    state.sessions.put(&sid, session);

    html_response(rendered, set_cookie)
}

// Begin: Redirect region --------
#[web::get("/view/{post}")]
async fn view_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", format!("/view/{}/", path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

#[web::get("/view/{post}/")]
async fn view(req: HttpRequest, path: web::types::Path<String>, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let post_id = PostId(path.into_inner());

    let session = state.sessions.get(&sid);
    let session = session::apply(&session, Event::OpenPost(post_id.clone()), &state.admin_password);
    state.sessions.put(&sid, session.clone());

    let posts = match state.store.fetch(session.include_drafts()).await {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error fetching post {}: {}", post_id.0, e);
            return web::HttpResponse::InternalServerError()
                .body("Error loading post");
        }
    };

    let rendered = match posts.iter().find(|post| post.id == post_id) {
        Some(post) => {
            let tpl_src = match read_template(&state.config.paths.template_dir, "view.tpl") {
                Ok(src) => src,
                Err(e) => return web::HttpResponse::InternalServerError()
                    .body(format!("Error loading view template: {}", e)),
            };
            let renderer = match PostRenderer::new(&tpl_src) {
                Ok(renderer) => renderer,
                Err(e) => return web::HttpResponse::InternalServerError()
                    .body(format!("{}", e)),
            };
            match renderer.render(post) {
                Ok(rendered) => rendered,
                Err(e) => return web::HttpResponse::InternalServerError()
                    .body(format!("Error rendering post {}: {}", post_id.0, e)),
            }
        }
        None => {
            // Gone or never visible to this session: warn, offer the way back
            let tpl_src = match read_template(&state.config.paths.template_dir, "missing.tpl") {
                Ok(src) => src,
                Err(e) => return web::HttpResponse::InternalServerError()
                    .body(format!("Error loading missing-post template: {}", e)),
            };
            let rendered = match MissingRenderer::new(&tpl_src) {
                Ok(renderer) => renderer.render(),
                Err(e) => return web::HttpResponse::InternalServerError()
                    .body(format!("{}", e)),
            };
            rendered
        }
    };

    html_response(rendered, set_cookie)
}

#[derive(Deserialize)]
struct LoginForm {
    password: String,
}

#[web::post("/login")]
async fn login(req: HttpRequest, form: web::types::Form<LoginForm>, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let session = state.sessions.get(&sid);

    let next = session::apply(&session, Event::Login(form.into_inner().password), &state.admin_password);
    if next.is_admin && !session.is_admin {
        info!("Admin session opened");
    } else if next.login_failed {
        warn!("Failed admin login attempt");
    }
    state.sessions.put(&sid, next);

    redirect_home(set_cookie)
}

#[web::post("/logout")]
async fn logout(req: HttpRequest, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let session = state.sessions.get(&sid);
    let next = session::apply(&session, Event::Logout, &state.admin_password);
    state.sessions.put(&sid, next);

    redirect_home(set_cookie)
}

#[derive(Deserialize)]
struct DraftsForm {
    // Checkbox: present when checked, absent when not
    show_drafts: Option<String>,
}

#[web::post("/drafts")]
async fn drafts(req: HttpRequest, form: web::types::Form<DraftsForm>, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let session = state.sessions.get(&sid);
    let show = form.into_inner().show_drafts.is_some();
    let next = session::apply(&session, Event::ShowDrafts(show), &state.admin_password);
    state.sessions.put(&sid, next);

    redirect_home(set_cookie)
}

#[derive(Deserialize)]
struct NewPostForm {
    title: String,
    date: String,
    location: String,
    tags: String,
    content: String,
    cover_image_url: String,
    gallery_image_urls: String,
    action: String,
}

#[web::post("/posts")]
async fn create_post(req: HttpRequest, form: web::types::Form<NewPostForm>, state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let (sid, set_cookie) = session_of(&req);
    let session = state.sessions.get(&sid);
    if !session.is_admin {
        return web::HttpResponse::Unauthorized()
            .body("Admin login required");
    }

    let form = form.into_inner();
    let action = match SubmitAction::from_str(&form.action) {
        Ok(action) => action,
        Err(e) => return web::HttpResponse::BadRequest().body(e),
    };

    let fields = NewPostFields {
        title: form.title,
        date: form.date,
        location: form.location,
        tags: form.tags,
        content: form.content,
        cover_image_url: form.cover_image_url,
        gallery_image_urls: form.gallery_image_urls,
    };
    let post = match assemble_post(fields, action) {
        Ok(post) => post,
        Err(e) => return web::HttpResponse::BadRequest()
            .body(format!("Error assembling post: {}", e)),
    };

    if let Err(e) = state.store.insert(&post).await {
        error!("Error inserting post {}: {}", post.id.0, e);
        return web::HttpResponse::InternalServerError()
            .body("Error storing post");
    }

    // The redirect target re-fetches the whole list, so the new post shows up
    redirect_home(set_cookie)
}

#[web::get("/rss")]
async fn rss(state: web::types::State<Arc<ServerState>>) -> web::HttpResponse {
    let feed = match state.config.rss_feed {
        Some(ref feed) => feed,
        None => return web::HttpResponse::NotFound()
            .body("No feed configured"),
    };

    // Published posts only, no matter who asks
    let mut posts = match state.store.fetch(false).await {
        Ok(posts) => posts,
        Err(e) => {
            error!("Error fetching posts for the feed: {}", e);
            return web::HttpResponse::InternalServerError()
                .body("Error loading posts");
        }
    };
    sort_newest_first(&mut posts);
    posts.truncate(feed.max_items as usize);

    let channel = RssChannel {
        ch_title: feed.title.as_str(),
        ch_link: feed.site_url.as_str(),
        ch_desc: feed.description.as_str(),
    };

    match channel.render(&posts) {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering feed: {}", e)),
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<ServerState>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config, secrets: Secrets) -> Result<()> {
    let store = open_store(&config, &secrets).await?;

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let state = Arc::new(ServerState {
        admin_password: secrets.admin_password,
        store,
        sessions: SessionMap::new(),
        config,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .service(home)
            .service(public_files)
            .service(rss)
            .service(view)
            .service(view_wo_slash)
            .service(login)
            .service(logout)
            .service(drafts)
            .service(create_post)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await?;

    Ok(())
}
