// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class and create the top-level window.
//   • Host the EDIT document view and the STATIC status line.
//   • Build the menu bar and keyboard accelerators.
//   • Run the Win32 message loop.
//   • Dispatch WM_COMMAND, WM_SIZE, WM_CLOSE, WM_DESTROY and the compile
//     completion message posted by the worker thread.
//
// ── State ownership ───────────────────────────────────────────────────────────
//
// `WindowState` is boxed and its pointer stored in GWLP_USERDATA once the
// child controls exist; WM_NCDESTROY takes it back and drops it.  Handlers
// reach it only through `with_state`, and never while a modal dialog or any
// other message pump is running, so at most one `&mut WindowState` exists at
// a time even though dialogs re-enter `wnd_proc`.

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{GetStockObject, UpdateWindow, DEFAULT_GUI_FONT, HBRUSH, WHITE_BRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::{VK_ESCAPE, VK_F5},
            WindowsAndMessaging::{
                AppendMenuW, CreateAcceleratorTableW, CreateMenu, CreateWindowExW,
                DefWindowProcW, DestroyAcceleratorTable, DestroyWindow, DispatchMessageW,
                GetClientRect, GetMessageW, GetWindowLongPtrW, LoadCursorW, LoadIconW,
                MessageBoxW, MoveWindow, PostMessageW, PostQuitMessage, RegisterClassExW,
                SendMessageW, SetMenu, SetWindowLongPtrW, SetWindowPos, SetWindowTextW,
                ShowWindow, TranslateAcceleratorW, TranslateMessage, ACCEL,
                CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, FCONTROL, FSHIFT, FVIRTKEY, GWLP_USERDATA,
                HACCEL, HMENU, IDC_ARROW, IDI_APPLICATION, IDNO, IDYES, MB_ICONERROR,
                MB_ICONINFORMATION, MB_ICONWARNING, MB_OK, MB_YESNOCANCEL, MESSAGEBOX_RESULT,
                MESSAGEBOX_STYLE, MF_POPUP, MF_SEPARATOR, MF_STRING, MSG, SWP_NOACTIVATE,
                SWP_NOZORDER, SW_SHOW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_CLOSE,
                WM_COMMAND, WM_DESTROY, WM_DPICHANGED, WM_NCDESTROY, WM_SETFOCUS, WM_SETFONT,
                WM_SIZE, WNDCLASSEXW, WS_CHILD, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
            },
        },
    },
};

use crate::{
    app::{App, CompileRequest},
    document::MAX_DOCUMENT_BYTES,
    editor::{
        edit::{
            messages::{EN_CHANGE, EN_MAXTEXT},
            EditView, EditorFont,
        },
        EDIT_CHAR_LIMIT,
    },
    error::{Result, TexpadError},
    platform::win32::{dialogs, dpi},
    settings::{self, Settings},
    ui::status::{self, Notice, Severity},
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("TexPadMainWindow");

/// Title bar text for a clean, untitled document.
const APP_TITLE: PCWSTR = w!("TexPad");

/// Default window size in device pixels at 96 DPI.
const DEFAULT_WIDTH: i32 = 800;
const DEFAULT_HEIGHT: i32 = 500;

/// Status line height and side margin at 96 DPI.
const STATUS_HEIGHT: i32 = 22;
const STATUS_MARGIN: i32 = 6;

// ── Child control ids ─────────────────────────────────────────────────────────

const IDC_EDIT: usize = 100;
const IDC_STATUS: usize = 101;

/// STATIC styles: single line, vertically centred.
const SS_LEFTNOWORDWRAP: u32 = 0x000C;
const SS_CENTERIMAGE: u32 = 0x0200;

// ── Menu command IDs ──────────────────────────────────────────────────────────

const IDM_FILE_OPEN: usize = 1001;
const IDM_FILE_SAVE: usize = 1002;
const IDM_FILE_SAVE_AS: usize = 1003;
const IDM_FILE_EXIT: usize = 1009;
const IDM_LATEX_CONVERT: usize = 2001;
const IDM_LATEX_STOP: usize = 2002;
const IDM_HELP_ABOUT: usize = 9001;

/// Posted by the compile worker once its report is in the channel.
const WM_APP_COMPILE_DONE: u32 = WM_APP + 1;

// ── Window state ──────────────────────────────────────────────────────────────

/// Everything the window procedure needs, owned by the main window.
///
/// Fields drop in declaration order: `app` first (joins nothing; teardown
/// already ran in WM_DESTROY), then the child handles, and `font` last so it
/// outlives the control it was selected into.
struct WindowState {
    app: App,
    edit: EditView,
    status: HWND,
    font: EditorFont,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the main window class, create the window, and drive the message
/// loop until the user closes the application.
pub(crate) fn run() -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::enable_per_monitor_awareness();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(TexpadError::from)?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;
    let hwnd = create_window(hinstance)?;
    attach_state(hwnd, hinstance, settings::load())?;

    // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
    // ShowWindow returns the previous visibility state; UpdateWindow returns
    // a success BOOL; both are ignored.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    #[cfg(debug_assertions)]
    log::debug!("window visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    let accel = build_accelerators()?;
    let result = message_loop(hwnd, accel);
    // SAFETY: accel came from CreateAcceleratorTableW and is no longer used.
    unsafe {
        let _ = DestroyAcceleratorTable(accel);
    }
    result
}

/// Show a modal error dialog with the given message.
///
/// Used by `main()` when `run()` returns an error.
pub(crate) fn show_error_dialog(message: &str) {
    message_box(HWND::default(), message, "TexPad \u{2014} Fatal Error", MB_OK | MB_ICONERROR);
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: LoadIconW with IDI_APPLICATION always succeeds; it loads the
    // built-in application icon resource, which exists on all Windows versions.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }.map_err(TexpadError::from)?;

    // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
    // a built-in resource guaranteed to exist on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(TexpadError::from)?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    // Casting to HBRUSH is correct: stock brush objects are compatible types.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }

    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(hinstance: HINSTANCE) -> Result<HWND> {
    let system_dpi = dpi::for_system();

    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module.
    // HWND::default() (null parent) creates a top-level window.
    // HMENU::default() (null menu): the menu is attached separately below.
    // None for lpParam: state is attached after the children exist.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            APP_TITLE,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            dpi::scale(DEFAULT_WIDTH, system_dpi),
            dpi::scale(DEFAULT_HEIGHT, system_dpi),
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )
    }
    .map_err(TexpadError::from)?;

    let menu = build_menu()?;
    // SAFETY: hwnd and menu are valid handles.
    unsafe { SetMenu(hwnd, menu) }.map_err(TexpadError::from)?;

    Ok(hwnd)
}

/// Create the child controls, box the state, and hang it off `hwnd`.
fn attach_state(hwnd: HWND, hinstance: HINSTANCE, settings: Settings) -> Result<()> {
    let window_dpi = dpi::for_window(hwnd);

    let edit = EditView::create(hwnd, hinstance, IDC_EDIT)?;
    let font = EditorFont::create(window_dpi)?;
    edit.set_font(&font);
    edit.set_limit(EDIT_CHAR_LIMIT);

    let ready = wide(status::READY);
    // SAFETY: "STATIC" is a system class; hwnd and hinstance are valid; the
    // HMENU slot carries the control id for a child window.
    let status = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("STATIC"),
            PCWSTR(ready.as_ptr()),
            WS_CHILD | WS_VISIBLE | WINDOW_STYLE(SS_LEFTNOWORDWRAP | SS_CENTERIMAGE),
            0, 0, 0, 0,
            hwnd,
            HMENU(IDC_STATUS as *mut c_void),
            hinstance,
            None,
        )
    }
    .map_err(TexpadError::from)?;

    // SAFETY: status is a valid child; DEFAULT_GUI_FONT is a stock object
    // that never needs freeing.
    unsafe {
        let gui_font = GetStockObject(DEFAULT_GUI_FONT);
        let _ = SendMessageW(status, WM_SETFONT, WPARAM(gui_font.0 as usize), LPARAM(1));
    }

    let state = Box::new(WindowState {
        app: App::new(settings),
        edit,
        status,
        font,
    });

    // SAFETY: the pointer comes from Box::into_raw and is reclaimed exactly
    // once, in WM_NCDESTROY via detach_state.
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
    }

    let mut rc = RECT::default();
    // SAFETY: hwnd valid; rc is a writable RECT.
    if unsafe { GetClientRect(hwnd, &mut rc) }.is_ok() {
        layout(hwnd, rc.right - rc.left, rc.bottom - rc.top);
    }
    edit.focus();
    Ok(())
}

/// Reclaim and drop the boxed `WindowState`.
fn detach_state(hwnd: HWND) {
    // SAFETY: swapping in 0 guarantees the pointer is taken only once.
    let ptr = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) } as *mut WindowState;
    if !ptr.is_null() {
        // SAFETY: ptr came from Box::into_raw in attach_state and nothing else
        // holds a reference (WM_NCDESTROY is the last message).
        drop(unsafe { Box::from_raw(ptr) });
    }
}

/// Run `f` against the window's state, if it has been attached.
///
/// `f` must not show dialogs or otherwise pump messages.
fn with_state<R>(hwnd: HWND, f: impl FnOnce(&mut WindowState) -> R) -> Option<R> {
    // SAFETY: GWLP_USERDATA holds either 0 or the pointer installed by
    // attach_state; all access happens on the UI thread, and no other
    // reference is live because callers never nest with_state.
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut WindowState;
    if ptr.is_null() {
        return None;
    }
    // SAFETY: see above; the Box stays alive until WM_NCDESTROY.
    Some(f(unsafe { &mut *ptr }))
}

// ── Menu & accelerators ───────────────────────────────────────────────────────

fn build_menu() -> Result<HMENU> {
    // SAFETY: CreateMenu has no preconditions; it always succeeds unless the
    // system is critically low on resources, in which case ? propagates the error.
    unsafe {
        let bar = CreateMenu().map_err(TexpadError::from)?;

        // ── File ──────────────────────────────────────────────────────────────
        let file = CreateMenu().map_err(TexpadError::from)?;
        AppendMenuW(file, MF_STRING, IDM_FILE_OPEN, w!("&Open\u{2026}\tCtrl+O"))
            .map_err(TexpadError::from)?;
        AppendMenuW(file, MF_STRING, IDM_FILE_SAVE, w!("&Save\tCtrl+S"))
            .map_err(TexpadError::from)?;
        AppendMenuW(file, MF_STRING, IDM_FILE_SAVE_AS, w!("Save &As\u{2026}\tCtrl+Shift+S"))
            .map_err(TexpadError::from)?;
        AppendMenuW(file, MF_SEPARATOR, 0, PCWSTR::null()).map_err(TexpadError::from)?;
        AppendMenuW(file, MF_STRING, IDM_FILE_EXIT, w!("E&xit\tAlt+F4"))
            .map_err(TexpadError::from)?;

        // ── LaTeX ─────────────────────────────────────────────────────────────
        let latex = CreateMenu().map_err(TexpadError::from)?;
        AppendMenuW(latex, MF_STRING, IDM_LATEX_CONVERT, w!("&Convert LaTeX\tF5"))
            .map_err(TexpadError::from)?;
        AppendMenuW(latex, MF_STRING, IDM_LATEX_STOP, w!("&Stop Compile\tEsc"))
            .map_err(TexpadError::from)?;

        // ── Help ──────────────────────────────────────────────────────────────
        let help = CreateMenu().map_err(TexpadError::from)?;
        AppendMenuW(help, MF_STRING, IDM_HELP_ABOUT, w!("&About TexPad\u{2026}"))
            .map_err(TexpadError::from)?;

        // The uIDNewItem parameter for MF_POPUP is the child HMENU cast to usize.
        AppendMenuW(bar, MF_POPUP, file.0 as usize, w!("&File")).map_err(TexpadError::from)?;
        AppendMenuW(bar, MF_POPUP, latex.0 as usize, w!("&LaTeX")).map_err(TexpadError::from)?;
        AppendMenuW(bar, MF_POPUP, help.0 as usize, w!("&Help")).map_err(TexpadError::from)?;

        Ok(bar)
    }
}

fn build_accelerators() -> Result<HACCEL> {
    let table = [
        ACCEL { fVirt: FVIRTKEY | FCONTROL, key: u16::from(b'O'), cmd: IDM_FILE_OPEN as u16 },
        ACCEL { fVirt: FVIRTKEY | FCONTROL, key: u16::from(b'S'), cmd: IDM_FILE_SAVE as u16 },
        ACCEL {
            fVirt: FVIRTKEY | FCONTROL | FSHIFT,
            key: u16::from(b'S'),
            cmd: IDM_FILE_SAVE_AS as u16,
        },
        ACCEL { fVirt: FVIRTKEY, key: VK_F5.0, cmd: IDM_LATEX_CONVERT as u16 },
        ACCEL { fVirt: FVIRTKEY, key: VK_ESCAPE.0, cmd: IDM_LATEX_STOP as u16 },
    ];
    // SAFETY: table is a valid ACCEL slice for the duration of the call; the
    // returned table is destroyed by run() after the message loop ends.
    unsafe { CreateAcceleratorTableW(&table) }.map_err(TexpadError::from)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(hwnd: HWND, accel: HACCEL) -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            0 => break,
            // SAFETY: msg was populated by a successful GetMessageW call and
            // accel is a live accelerator table.  Accelerators are routed to
            // the main window even when the edit control has focus.
            _ => unsafe {
                if TranslateAcceleratorW(hwnd, accel, &msg) == 0 {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // ── Commands ──────────────────────────────────────────────────────────
        WM_COMMAND => {
            let id = wparam.0 & 0xFFFF;
            let code = ((wparam.0 >> 16) & 0xFFFF) as u32;

            match id {
                IDC_EDIT => on_edit_notify(hwnd, code),
                IDM_FILE_OPEN => on_open(hwnd),
                IDM_FILE_SAVE => {
                    on_save(hwnd);
                }
                IDM_FILE_SAVE_AS => {
                    on_save_as(hwnd);
                }
                IDM_FILE_EXIT => close_if_confirmed(hwnd),
                IDM_LATEX_CONVERT => on_convert(hwnd),
                IDM_LATEX_STOP => on_stop(hwnd),
                IDM_HELP_ABOUT => about_dialog(hwnd),
                _ => return DefWindowProcW(hwnd, msg, wparam, lparam),
            }
            LRESULT(0)
        }

        WM_APP_COMPILE_DONE => {
            on_compile_done(hwnd);
            LRESULT(0)
        }

        // ── Layout & focus ────────────────────────────────────────────────────
        WM_SIZE => {
            // lparam low word = new client width, high word = new client height.
            let width = (lparam.0 & 0xFFFF) as i32;
            let height = ((lparam.0 >> 16) & 0xFFFF) as i32;
            layout(hwnd, width, height);
            LRESULT(0)
        }

        WM_SETFOCUS => {
            if let Some(edit) = with_state(hwnd, |s| s.edit) {
                edit.focus();
            }
            LRESULT(0)
        }

        WM_DPICHANGED => {
            let new_dpi = (wparam.0 & 0xFFFF) as u32;
            // SAFETY: for WM_DPICHANGED, lparam points to a RECT with the
            // suggested new window bounds, valid for this call.
            let rc = *(lparam.0 as *const RECT);
            on_dpi_changed(hwnd, new_dpi, rc);
            LRESULT(0)
        }

        // ── Lifecycle ─────────────────────────────────────────────────────────
        WM_CLOSE => {
            close_if_confirmed(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            on_destroy(hwnd);
            // SAFETY: PostQuitMessage with exit code 0 is always safe to call
            // from WM_DESTROY. It posts WM_QUIT to the thread's message queue.
            PostQuitMessage(0);
            LRESULT(0)
        }

        WM_NCDESTROY => {
            detach_state(hwnd);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        // SAFETY: hwnd and message parameters are provided by Windows.
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn on_edit_notify(hwnd: HWND, code: u32) {
    match code {
        EN_CHANGE => {
            if with_state(hwnd, |s| s.app.mark_dirty()) == Some(true) {
                refresh_title(hwnd);
            }
        }
        EN_MAXTEXT => set_status(
            hwnd,
            &format!("The editor is full ({} KiB limit).", MAX_DOCUMENT_BYTES / 1024),
        ),
        _ => {}
    }
}

fn on_open(hwnd: HWND) {
    if !confirm_discard(hwnd) {
        return;
    }
    let Some(last_dir) = with_state(hwnd, |s| s.app.settings.last_dir.clone()) else {
        return;
    };
    let Some(path) = dialogs::show_open_dialog(hwnd, last_dir.as_deref()) else {
        return;
    };

    log::info!("opening {}", path.display());
    match with_state(hwnd, |s| s.app.open_file(path).map(|text| (s.edit, text))) {
        Some(Ok((edit, text))) => {
            edit.set_text(&text);
            // Replacing the text may have raised EN_CHANGE.
            with_state(hwnd, |s| s.app.doc.dirty = false);
            refresh_title(hwnd);
            set_status(hwnd, status::READY);
        }
        Some(Err(e)) => {
            log::warn!("open failed: {e}");
            show_error(hwnd, &format!("Error opening file.\n\n{e}"));
        }
        None => {}
    }
}

/// Save to the current path, or prompt for one.  Returns `true` on success.
fn on_save(hwnd: HWND) -> bool {
    match with_state(hwnd, |s| s.app.doc.path.clone()) {
        Some(Some(path)) => save_to(hwnd, path),
        Some(None) => on_save_as(hwnd),
        None => false,
    }
}

fn on_save_as(hwnd: HWND) -> bool {
    let Some((name, last_dir)) = with_state(hwnd, |s| {
        let name = match s.app.doc.path {
            Some(_) => s.app.doc.display_name(),
            None => "untitled.tex".to_owned(),
        };
        (name, s.app.settings.last_dir.clone())
    }) else {
        return false;
    };
    match dialogs::show_save_dialog(hwnd, &name, last_dir.as_deref()) {
        Some(path) => save_to(hwnd, path),
        None => false,
    }
}

fn save_to(hwnd: HWND, path: std::path::PathBuf) -> bool {
    let Some(edit) = with_state(hwnd, |s| s.edit) else {
        return false;
    };
    let text = edit.get_text();

    log::info!("saving {}", path.display());
    match with_state(hwnd, |s| s.app.save(path, &text)) {
        Some(Ok(())) => {
            refresh_title(hwnd);
            true
        }
        Some(Err(e)) => {
            log::warn!("save failed: {e}");
            show_error(hwnd, &format!("Error saving file.\n\n{e}"));
            false
        }
        None => false,
    }
}

fn on_convert(hwnd: HWND) {
    let Some(edit) = with_state(hwnd, |s| s.edit) else {
        return;
    };
    let text = edit.get_text();

    // HWND is not Send; the worker only needs the raw value to post to it.
    let raw_hwnd = hwnd.0 as isize;
    let notify = move || post_compile_done(raw_hwnd);

    match with_state(hwnd, |s| s.app.start_compile(&text, notify)) {
        Some(Ok(CompileRequest::Started(id))) => {
            log::info!("compile job {id} started");
            set_status(hwnd, status::PROCESSING);
        }
        Some(Ok(CompileRequest::Busy)) => set_status(hwnd, status::BUSY),
        Some(Err(e)) => {
            log::warn!("compile not started: {e}");
            show_error(hwnd, &format!("Error creating LaTeX file.\n\n{e}"));
        }
        None => {}
    }
}

fn on_stop(hwnd: HWND) {
    match with_state(hwnd, |s| s.app.stop_compile()) {
        Some(true) => set_status(hwnd, status::STOPPING),
        Some(false) => set_status(hwnd, status::NOTHING_TO_STOP),
        None => {}
    }
}

fn on_compile_done(hwnd: HWND) {
    let reports = with_state(hwnd, |s| s.app.take_reports()).unwrap_or_default();
    for report in &reports {
        let view = status::describe(report);
        set_status(hwnd, &view.status);
        if let Some(notice) = view.notice {
            show_notice(hwnd, &notice);
        }
    }
}

fn on_dpi_changed(hwnd: HWND, new_dpi: u32, suggested: RECT) {
    // SAFETY: hwnd valid; the suggested rect comes from Windows for this DPI.
    unsafe {
        let _ = SetWindowPos(
            hwnd,
            HWND::default(),
            suggested.left,
            suggested.top,
            suggested.right - suggested.left,
            suggested.bottom - suggested.top,
            SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }

    match EditorFont::create(new_dpi) {
        Ok(font) => {
            if let Some(edit) = with_state(hwnd, |s| s.edit) {
                edit.set_font(&font);
                // The previous font is dropped only after the control let go of it.
                with_state(hwnd, |s| s.font = font);
            }
        }
        Err(e) => log::warn!("keeping old font after DPI change: {e}"),
    }
}

fn close_if_confirmed(hwnd: HWND) {
    if confirm_discard(hwnd) {
        // SAFETY: hwnd is the main window; DestroyWindow triggers WM_DESTROY,
        // which posts WM_QUIT via PostQuitMessage.
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
    }
}

fn on_destroy(hwnd: HWND) {
    with_state(hwnd, |s| {
        s.app.shutdown();
        if let Err(e) = settings::save(&s.app.settings) {
            log::warn!("settings not saved: {e}");
        }
    });
}

/// Ask whether to save unsaved changes.  Returns `false` to abort the
/// operation that would discard them.
fn confirm_discard(hwnd: HWND) -> bool {
    let Some((dirty, name)) = with_state(hwnd, |s| (s.app.doc.dirty, s.app.doc.display_name()))
    else {
        return true;
    };
    if !dirty {
        return true;
    }
    let body = format!("Save changes to {name}?");
    match message_box(hwnd, &body, "TexPad", MB_YESNOCANCEL | MB_ICONWARNING) {
        IDYES => on_save(hwnd),
        IDNO => true,
        _ => false,
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

fn layout(hwnd: HWND, width: i32, height: i32) {
    let Some((edit, status)) = with_state(hwnd, |s| (s.edit, s.status)) else {
        return;
    };
    let window_dpi = dpi::for_window(hwnd);
    let status_h = dpi::scale(STATUS_HEIGHT, window_dpi);
    let margin = dpi::scale(STATUS_MARGIN, window_dpi);
    let edit_h = (height - status_h).max(0);

    // SAFETY: both children are valid for the lifetime of the parent.
    unsafe {
        let _ = MoveWindow(edit.hwnd(), 0, 0, width, edit_h, true);
        let _ = MoveWindow(status, margin, edit_h, (width - 2 * margin).max(0), status_h, true);
    }
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn refresh_title(hwnd: HWND) {
    if let Some(title) = with_state(hwnd, |s| s.app.window_title()) {
        let title = wide(&title);
        // SAFETY: hwnd valid; title is null-terminated and outlives the call.
        unsafe {
            let _ = SetWindowTextW(hwnd, PCWSTR(title.as_ptr()));
        }
    }
}

fn set_status(hwnd: HWND, text: &str) {
    if let Some(status) = with_state(hwnd, |s| s.status) {
        let text = wide(text);
        // SAFETY: status is a valid STATIC child; text outlives the call.
        unsafe {
            let _ = SetWindowTextW(status, PCWSTR(text.as_ptr()));
        }
    }
}

/// Wake the UI thread after a compile report was queued.  Called from the
/// worker thread.
fn post_compile_done(raw_hwnd: isize) {
    // SAFETY: PostMessageW may be called from any thread.  If the window is
    // already gone the call fails harmlessly and the report is never read.
    unsafe {
        let _ = PostMessageW(
            HWND(raw_hwnd as *mut c_void),
            WM_APP_COMPILE_DONE,
            WPARAM(0),
            LPARAM(0),
        );
    }
}

fn show_notice(hwnd: HWND, notice: &Notice) {
    let icon = match notice.severity {
        Severity::Info => MB_ICONINFORMATION,
        Severity::Error => MB_ICONERROR,
    };
    message_box(hwnd, &notice.body, notice.title, MB_OK | icon);
}

fn show_error(hwnd: HWND, body: &str) {
    message_box(hwnd, body, "Error", MB_OK | MB_ICONERROR);
}

/// Display the "About TexPad" information dialog.
fn about_dialog(hwnd: HWND) {
    let body = concat!(
        "TexPad 0.1.0\n\n",
        "A minimal LaTeX editor. F5 compiles the buffer with pdflatex.\n\n",
        "Licensed under MIT OR Apache-2.0.",
    );
    message_box(hwnd, body, "About TexPad", MB_OK | MB_ICONINFORMATION);
}

fn message_box(hwnd: HWND, body: &str, title: &str, style: MESSAGEBOX_STYLE) -> MESSAGEBOX_RESULT {
    let body = wide(body);
    let title = wide(title);
    // SAFETY: body and title are valid null-terminated UTF-16 strings that
    // remain allocated for the duration of the MessageBoxW call.  A null
    // hwnd means the dialog has no owner window.
    unsafe { MessageBoxW(hwnd, PCWSTR(body.as_ptr()), PCWSTR(title.as_ptr()), style) }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `TexpadError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> TexpadError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    TexpadError::Win32 {
        function,
        code: code.0,
    }
}
