// G2 controller register map

// Bus framing preambles
pub const HEADER_INDEX: u8 = 0x70; // Register index follows
pub const HEADER_DATA: u8 = 0x72; // Register data follows
pub const HEADER_READ: u8 = 0x73; // Register read, dummy byte clocks the value out
pub const HEADER_ID: u8 = 0x71; // Controller ID probe
pub const COG_ID: u8 = 0x12; // Expected answer to the ID probe

// Registers
pub const CHANNEL_SELECT: u8 = 0x01; // Channel data (8 bytes)
pub const OUTPUT_ENABLE: u8 = 0x02; // Output enable / line commit
pub const DRIVER_LATCH: u8 = 0x03; // Driver latch
pub const POWER_SETTING: u8 = 0x04; // Power setting / internal discharge
pub const CHARGE_PUMP: u8 = 0x05; // Charge pump control
pub const OSCILLATOR: u8 = 0x07; // Oscillator / high power mode
pub const POWER_MODE: u8 = 0x08; // Power mode
pub const VCOM_LEVEL: u8 = 0x09; // Vcom level
pub const LINE_DATA: u8 = 0x0A; // One encoded line
pub const POWER_SAVING: u8 = 0x0B; // Power saving mode
pub const STATUS: u8 = 0x0F; // Status register (read)

// OUTPUT_ENABLE values
pub const OE_DISABLE: u8 = 0x40; // Disable output enable
pub const OE_DISABLE_READY: u8 = 0x06; // Output enable to disable, after the pump is up
pub const OE_COMMIT_LINE: u8 = 0x07; // Drive the line just written

// STATUS bits
pub const STATUS_BREAKAGE_OK: u8 = 0x80; // Controller intact
pub const STATUS_PUMP_READY: u8 = 0x40; // DC/DC level reached

// CHARGE_PUMP values
pub const PUMP_OFF: u8 = 0x00;
pub const PUMP_POSITIVE: u8 = 0x01; // Positive voltage on
pub const PUMP_NEGATIVE: u8 = 0x03; // Positive + negative voltage on
pub const PUMP_VCOM: u8 = 0x0F; // Positive + negative + Vcom on

// Power-up register values
pub const POWER_SAVING_ON: u8 = 0x02;
pub const POWER_SAVING_OFF: u8 = 0x00;
pub const CHANNEL_DATA_144: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x0F, 0xFF, 0x00];
pub const HIGH_POWER_MODE: u8 = 0xD1;
pub const POWER_MODE_DEFAULT: u8 = 0x02;
pub const VCOM_DEFAULT: u8 = 0xC2;
pub const POWER_SETTING_DEFAULT: u8 = 0x03;
pub const LATCH_ON: u8 = 0x01;
pub const LATCH_OFF: u8 = 0x00;

// Power-down register values
pub const DISCHARGE_INTERNAL: u8 = 0x80;
pub const OSCILLATOR_OFF: u8 = 0x01;
