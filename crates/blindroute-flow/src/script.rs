//! Spoken lines of the guided screens.

use blindroute_core::{Bus, BusArrival, Forwarding, Station};

pub(crate) const SEARCH_GUIDE: &str = "정류장 검색 페이지입니다. 텍스트 또는 음성인식으로 입력할 수 있습니다. 입력 후 왼쪽으로 스와이프하면 정류장 검색을 시작합니다.";
pub(crate) const NO_WORDS_DETECTED: &str = "인식된 단어가 없습니다. 다시 시도해주세요.";
pub(crate) const STATION_LOOKUP_FAILED: &str = "정류장 정보를 불러오지 못했습니다. 다시 시도해주세요.";
pub(crate) const STATION_GUIDE: &str = "정류장을 선택하세요. 위아래 스와이프로 정류장을 선택할 수 있습니다.";
pub(crate) const NO_BUSES_AT_STATION: &str = "이 정류장을 지나는 버스가 없습니다.";
pub(crate) const BUS_LOOKUP_FAILED: &str = "버스 정보를 불러오지 못했습니다. 다시 시도해주세요.";
pub(crate) const BUS_GUIDE: &str = "버스를 선택하세요. 위아래 스와이프로 버스를 선택할 수 있습니다.";
pub(crate) const RESERVATION_FAILED: &str = "버스를 예약하는데 실패했습니다";
pub(crate) const NO_VEHICLE_RUNNING: &str = "지금은 운행하는 버스가 없습니다.";
pub(crate) const BUS_ARRIVED: &str = "버스가 도착했습니다.";
pub(crate) const RESERVATION_CANCELLED: &str = "버스 예약을 취소하였습니다.";
pub(crate) const ALIGHTING_RESERVED: &str = "하차 예약이 완료되었습니다. 안전하게 하차하세요.";
pub(crate) const ALIGHTING_FAILED: &str = "하차 예약에 실패했습니다. 다시 시도해주세요.";

pub(crate) const CHAT_GREETING: &str = "안녕하세요, 저는 당신의 AI 비서 에이닷입니다.";
pub(crate) const CHAT_NAVIGATION_START: &str = "시각장애인 전용 길안내를 시작하겠습니다. 출발지와 목적지를 말해주세요.";
pub(crate) const CHAT_NOT_UNDERSTOOD: &str = "이해를 잘 못했습니다. 다시 말해주세요.";
pub(crate) const CHAT_ROUTE_RETRY: &str = "출발지와 도착지를 다시 말해주세요.";

pub(crate) fn no_stations_found(query: &str) -> String {
    format!("'{}'가 이름에 포함된 정류장이 없습니다", query)
}

pub(crate) fn station_item(station: &Station) -> String {
    format!(
        "\"{}\", 정류장 번호 {}. 왼쪽으로 스와이프하면 정류장을 선택합니다.",
        station.st_nm, station.ars_id
    )
}

pub(crate) fn bus_item(bus: &Bus) -> String {
    format!(
        "\"{}번\", {} 방면. 왼쪽으로 스와이프하면 버스를 선택합니다.",
        bus.spoken_name(),
        bus.adirection
    )
}

pub(crate) fn waiting(route: &str, arrival: &BusArrival, with_cancel_hint: bool) -> String {
    let mut text = format!(
        "{} 버스를 대기중입니다. {}. {}.",
        route, arrival.bus_arr_msg1, arrival.bus_arr_msg2
    );
    if with_cancel_hint {
        text.push_str(" 오른쪽으로 스와이프하면 버스 대기 예약을 취소합니다.");
    }
    text
}

pub(crate) fn alighting(route: &str, destination: Option<&str>) -> String {
    match destination {
        Some(dest) => format!(
            "{} 버스에 탑승하였습니다. {} 정류장 하차 예약을 하려면 왼쪽으로 스와이프를 하세요.",
            route, dest
        ),
        None => format!(
            "{} 버스에 탑승하였습니다. 하차 예약을 하려면 왼쪽으로 스와이프를 하세요.",
            route
        ),
    }
}

pub(crate) fn routing(forwarding: &Forwarding) -> String {
    format!(
        "{} 정류장에서 {} 버스를 타고 {} 정류장까지 이동합니다. 왼쪽으로 스와이프하면 버스 예약을 진행합니다.",
        forwarding.from_station_nm, forwarding.bus_route_nm, forwarding.to_station_nm
    )
}

pub(crate) fn bus_confirm(forwarding: &Forwarding) -> String {
    format!(
        "{} 정류장에서 {} 버스, {} 방면 버스 예약을 하려면 왼쪽으로 스와이프를 하세요.",
        forwarding.from_station_nm, forwarding.bus_route_nm, forwarding.bus_route_dir
    )
}
