use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    checkin::{
        assign_checkin, deassign_checkin, delete_checkin, generate_checkins, reassign_checkin,
        register_checkin, show_checkin, show_checkin_list, show_summaries, update_checkin,
    },
    facility::{
        delete_facility, register_facility, show_facility, show_facility_by_name,
        show_facility_by_scope, show_facility_list, update_facility,
    },
    guest::{
        delete_guest, register_guest, show_guest, show_guest_by_name, show_guest_checkins,
        show_guest_list, update_guest,
    },
    template::{
        delete_template, register_template, show_template, show_template_by_name,
        show_template_list, update_template,
    },
    user::{delete_user, register_user, show_user, show_user_list, update_user},
};

pub fn build_facility_routers() -> Router<AppRegistry> {
    let facility_routers = Router::new()
        .route("/", get(show_facility_list))
        .route("/", post(register_facility))
        .route("/exact/:name", get(show_facility_by_name))
        .route("/scope/:scope", get(show_facility_by_scope))
        .route("/:facility_id", get(show_facility))
        .route("/:facility_id", put(update_facility))
        .route("/:facility_id", delete(delete_facility))
        .merge(build_guest_routers())
        .merge(build_template_routers())
        .merge(build_user_routers())
        .merge(build_checkin_routers());

    Router::new().nest("/facilities", facility_routers)
}

fn build_guest_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/:facility_id/guests", get(show_guest_list))
        .route("/:facility_id/guests", post(register_guest))
        .route(
            "/:facility_id/guests/exact/:first_name/:last_name",
            get(show_guest_by_name),
        )
        .route("/:facility_id/guests/:guest_id", get(show_guest))
        .route("/:facility_id/guests/:guest_id", put(update_guest))
        .route("/:facility_id/guests/:guest_id", delete(delete_guest))
        .route(
            "/:facility_id/guests/:guest_id/checkins",
            get(show_guest_checkins),
        )
}

fn build_template_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/:facility_id/templates", get(show_template_list))
        .route("/:facility_id/templates", post(register_template))
        .route(
            "/:facility_id/templates/exact/:name",
            get(show_template_by_name),
        )
        .route("/:facility_id/templates/:template_id", get(show_template))
        .route("/:facility_id/templates/:template_id", put(update_template))
        .route(
            "/:facility_id/templates/:template_id",
            delete(delete_template),
        )
}

fn build_user_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/:facility_id/users", get(show_user_list))
        .route("/:facility_id/users", post(register_user))
        .route("/:facility_id/users/:user_id", get(show_user))
        .route("/:facility_id/users/:user_id", put(update_user))
        .route("/:facility_id/users/:user_id", delete(delete_user))
}

fn build_checkin_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/:facility_id/checkins", get(show_checkin_list))
        .route("/:facility_id/checkins", post(register_checkin))
        .route(
            "/:facility_id/checkins/generate/:checkin_date/:template_id",
            post(generate_checkins),
        )
        .route(
            "/:facility_id/checkins/summaries/:since/:until",
            get(show_summaries),
        )
        .route("/:facility_id/checkins/:checkin_id", get(show_checkin))
        .route("/:facility_id/checkins/:checkin_id", put(update_checkin))
        .route("/:facility_id/checkins/:checkin_id", delete(delete_checkin))
        .route(
            "/:facility_id/checkins/:checkin_id/assignment",
            post(assign_checkin),
        )
        .route(
            "/:facility_id/checkins/:checkin_id/assignment",
            delete(deassign_checkin),
        )
        .route(
            "/:facility_id/checkins/:checkin_id/reassignment/:new_checkin_id",
            post(reassign_checkin),
        )
}
