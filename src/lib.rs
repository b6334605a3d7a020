pub mod commands;
pub mod db;
pub mod error;
pub mod manco;
pub mod models;
pub mod shift_stats;


use commands::{guests, ingredients, mancos, orders, shifts};
use db::Database;
use tauri::{
    menu::{Menu, MenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    Manager,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hotel_ops_lib=debug"));

    // A second init (e.g. from a test harness) is not an error
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();
    info!("Starting Hotel Ops v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            // Initialize database
            let db = Database::new(app.handle())?;
            db.initialize()?;
            app.manage(db);

            // Create tray menu
            let quit = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;
            let menu = Menu::with_items(app, &[&quit])?;

            let mut tray = TrayIconBuilder::new()
                .menu(&menu)
                .show_menu_on_left_click(false)
                .on_tray_icon_event(|tray, event| {
                    if let TrayIconEvent::Click {
                        button: MouseButton::Left,
                        button_state: MouseButtonState::Up,
                        ..
                    } = event
                    {
                        let app = tray.app_handle();
                        if let Some(window) = app.get_webview_window("main") {
                            if window.is_visible().unwrap_or(false) {
                                let _ = window.hide();
                            } else {
                                let _ = window.show();
                                let _ = window.set_focus();
                            }
                        }
                    }
                })
                .on_menu_event(|app, event| {
                    if event.id == "quit" {
                        info!("quit requested from tray");
                        app.exit(0);
                    }
                });
            if let Some(icon) = app.default_window_icon() {
                tray = tray.icon(icon.clone());
            }
            tray.build(app)?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Ingredients
            ingredients::list_ingredients,
            ingredients::create_ingredient,
            ingredients::update_ingredient,
            ingredients::delete_ingredient,
            ingredients::get_low_stock_ingredients,
            // Supplier orders
            orders::get_orders,
            orders::get_order,
            orders::create_order,
            orders::receive_order,
            orders::delete_order,
            // Shortages
            mancos::get_mancos,
            mancos::get_supplier_stats,
            // Shifts
            shifts::open_shift,
            shifts::get_open_shift,
            shifts::preview_shift_statistics,
            shifts::close_shift,
            shifts::get_shift_history,
            // Guests
            guests::get_shift_guests,
            guests::add_guest,
            guests::check_in_guest,
            guests::undo_check_in,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
