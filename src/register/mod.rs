//! Definiciones de registros para el MPU6050
//!
//! El MPU6050 tiene un único banco de 128 direcciones de 7 bits.

/// Direcciones absolutas de los registros
pub mod registers {
    // Registros de trimado y offsets de fábrica
    pub const AUX_VDDIO: u8 = 0x01;
    pub const XA_OFFS_USRH: u8 = 0x06;
    pub const XA_OFFS_USRL: u8 = 0x07;
    pub const YA_OFFS_USRH: u8 = 0x08;
    pub const YA_OFFS_USRL: u8 = 0x09;
    pub const ZA_OFFS_USRH: u8 = 0x0A;
    pub const ZA_OFFS_USRL: u8 = 0x0B;
    pub const PROD_ID: u8 = 0x0C;

    // Registros de auto-test
    pub const SELF_TEST_X: u8 = 0x0D;
    pub const SELF_TEST_Y: u8 = 0x0E;
    pub const SELF_TEST_Z: u8 = 0x0F;
    pub const SELF_TEST_A: u8 = 0x10;

    pub const XG_OFFS_USRH: u8 = 0x13;
    pub const XG_OFFS_USRL: u8 = 0x14;
    pub const YG_OFFS_USRH: u8 = 0x15;
    pub const YG_OFFS_USRL: u8 = 0x16;
    pub const ZG_OFFS_USRH: u8 = 0x17;
    pub const ZG_OFFS_USRL: u8 = 0x18;

    // Registros de configuración
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const FF_THR: u8 = 0x1D;
    pub const FF_DUR: u8 = 0x1E;
    pub const MOT_THR: u8 = 0x1F;
    pub const MOT_DUR: u8 = 0x20;
    pub const ZRMOT_THR: u8 = 0x21;
    pub const ZRMOT_DUR: u8 = 0x22;
    pub const FIFO_EN: u8 = 0x23;

    // Bus auxiliar (sólo se decodifica, no se controla)
    pub const I2C_MST_CTRL: u8 = 0x24;
    pub const I2C_SLV0_ADDR: u8 = 0x25;
    pub const I2C_SLV0_REG: u8 = 0x26;
    pub const I2C_SLV0_CTRL: u8 = 0x27;
    pub const I2C_SLV1_ADDR: u8 = 0x28;
    pub const I2C_SLV1_REG: u8 = 0x29;
    pub const I2C_SLV1_CTRL: u8 = 0x2A;
    pub const I2C_SLV2_ADDR: u8 = 0x2B;
    pub const I2C_SLV2_REG: u8 = 0x2C;
    pub const I2C_SLV2_CTRL: u8 = 0x2D;
    pub const I2C_SLV3_ADDR: u8 = 0x2E;
    pub const I2C_SLV3_REG: u8 = 0x2F;
    pub const I2C_SLV3_CTRL: u8 = 0x30;
    pub const I2C_SLV4_ADDR: u8 = 0x31;
    pub const I2C_SLV4_REG: u8 = 0x32;
    pub const I2C_SLV4_DO: u8 = 0x33;
    pub const I2C_SLV4_CTRL: u8 = 0x34;
    pub const I2C_SLV4_DI: u8 = 0x35;
    pub const I2C_MST_STATUS: u8 = 0x36;

    // Interrupciones
    pub const INT_PIN_CFG: u8 = 0x37;
    pub const INT_ENABLE: u8 = 0x38;
    pub const DMP_INT_STATUS: u8 = 0x39;
    pub const INT_STATUS: u8 = 0x3A;

    // Registros de datos
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const ACCEL_XOUT_L: u8 = 0x3C;
    pub const ACCEL_YOUT_H: u8 = 0x3D;
    pub const ACCEL_YOUT_L: u8 = 0x3E;
    pub const ACCEL_ZOUT_H: u8 = 0x3F;
    pub const ACCEL_ZOUT_L: u8 = 0x40;
    pub const TEMP_OUT_H: u8 = 0x41;
    pub const TEMP_OUT_L: u8 = 0x42;
    pub const GYRO_XOUT_H: u8 = 0x43;
    pub const GYRO_XOUT_L: u8 = 0x44;
    pub const GYRO_YOUT_H: u8 = 0x45;
    pub const GYRO_YOUT_L: u8 = 0x46;
    pub const GYRO_ZOUT_H: u8 = 0x47;
    pub const GYRO_ZOUT_L: u8 = 0x48;
    pub const EXT_SENS_DATA_00: u8 = 0x49;
    pub const EXT_SENS_DATA_23: u8 = 0x60;

    pub const MOT_DETECT_STATUS: u8 = 0x61;
    pub const I2C_SLV0_DO: u8 = 0x63;
    pub const I2C_SLV1_DO: u8 = 0x64;
    pub const I2C_SLV2_DO: u8 = 0x65;
    pub const I2C_SLV3_DO: u8 = 0x66;
    pub const I2C_MST_DELAY_CTRL: u8 = 0x67;
    pub const SIGNAL_PATH_RESET: u8 = 0x68;
    pub const MOT_DETECT_CTRL: u8 = 0x69;

    // Control de usuario y energía
    pub const USER_CTRL: u8 = 0x6A;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const PWR_MGMT_2: u8 = 0x6C;

    // Acceso a memoria del DMP (no soportado, sólo nombres)
    pub const BANK_SEL: u8 = 0x6D;
    pub const MEM_START_ADDR: u8 = 0x6E;
    pub const MEM_R_W: u8 = 0x6F;
    pub const PRGM_START_H: u8 = 0x70;
    pub const PRGM_START_L: u8 = 0x71;

    // FIFO
    pub const FIFO_COUNT_H: u8 = 0x72;
    pub const FIFO_COUNT_L: u8 = 0x73;
    pub const FIFO_R_W: u8 = 0x74;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Número de direcciones posibles (7 bits)
pub const REGISTER_COUNT: usize = 128;

/// Orden fijo en que se escriben los registros de configuración
pub const CONFIG_WRITE_ORDER: [u8; 10] = [
    registers::PWR_MGMT_1,
    registers::PWR_MGMT_2,
    registers::CONFIG,
    registers::SMPLRT_DIV,
    registers::ACCEL_CONFIG,
    registers::GYRO_CONFIG,
    registers::USER_CTRL,
    registers::FIFO_EN,
    registers::INT_PIN_CFG,
    registers::INT_ENABLE,
];

/// Registros de offset de usuario, parte alta, en orden Xa, Ya, Za, Xg, Yg, Zg
pub const OFFSET_REGISTERS: [u8; 6] = [
    registers::XA_OFFS_USRH,
    registers::YA_OFFS_USRH,
    registers::ZA_OFFS_USRH,
    registers::XG_OFFS_USRH,
    registers::YG_OFFS_USRH,
    registers::ZG_OFFS_USRH,
];

/// Devuelve el nombre simbólico de un registro, o `None` si la dirección no está mapeada.
pub const fn register_name(addr: u8) -> Option<&'static str> {
    use registers::*;

    let name = match addr {
        AUX_VDDIO => "AUX_VDDIO",
        XA_OFFS_USRH => "XA_OFFS_USRH",
        XA_OFFS_USRL => "XA_OFFS_USRL",
        YA_OFFS_USRH => "YA_OFFS_USRH",
        YA_OFFS_USRL => "YA_OFFS_USRL",
        ZA_OFFS_USRH => "ZA_OFFS_USRH",
        ZA_OFFS_USRL => "ZA_OFFS_USRL",
        PROD_ID => "PROD_ID",
        SELF_TEST_X => "SELF_TEST_X",
        SELF_TEST_Y => "SELF_TEST_Y",
        SELF_TEST_Z => "SELF_TEST_Z",
        SELF_TEST_A => "SELF_TEST_A",
        XG_OFFS_USRH => "XG_OFFS_USRH",
        XG_OFFS_USRL => "XG_OFFS_USRL",
        YG_OFFS_USRH => "YG_OFFS_USRH",
        YG_OFFS_USRL => "YG_OFFS_USRL",
        ZG_OFFS_USRH => "ZG_OFFS_USRH",
        ZG_OFFS_USRL => "ZG_OFFS_USRL",
        SMPLRT_DIV => "SMPLRT_DIV",
        CONFIG => "CONFIG",
        GYRO_CONFIG => "GYRO_CONFIG",
        ACCEL_CONFIG => "ACCEL_CONFIG",
        FF_THR => "FF_THR",
        FF_DUR => "FF_DUR",
        MOT_THR => "MOT_THR",
        MOT_DUR => "MOT_DUR",
        ZRMOT_THR => "ZRMOT_THR",
        ZRMOT_DUR => "ZRMOT_DUR",
        FIFO_EN => "FIFO_EN",
        I2C_MST_CTRL => "I2C_MST_CTRL",
        I2C_SLV0_ADDR => "I2C_SLV0_ADDR",
        I2C_SLV0_REG => "I2C_SLV0_REG",
        I2C_SLV0_CTRL => "I2C_SLV0_CTRL",
        I2C_SLV1_ADDR => "I2C_SLV1_ADDR",
        I2C_SLV1_REG => "I2C_SLV1_REG",
        I2C_SLV1_CTRL => "I2C_SLV1_CTRL",
        I2C_SLV2_ADDR => "I2C_SLV2_ADDR",
        I2C_SLV2_REG => "I2C_SLV2_REG",
        I2C_SLV2_CTRL => "I2C_SLV2_CTRL",
        I2C_SLV3_ADDR => "I2C_SLV3_ADDR",
        I2C_SLV3_REG => "I2C_SLV3_REG",
        I2C_SLV3_CTRL => "I2C_SLV3_CTRL",
        I2C_SLV4_ADDR => "I2C_SLV4_ADDR",
        I2C_SLV4_REG => "I2C_SLV4_REG",
        I2C_SLV4_DO => "I2C_SLV4_DO",
        I2C_SLV4_CTRL => "I2C_SLV4_CTRL",
        I2C_SLV4_DI => "I2C_SLV4_DI",
        I2C_MST_STATUS => "I2C_MST_STATUS",
        INT_PIN_CFG => "INT_PIN_CFG",
        INT_ENABLE => "INT_ENABLE",
        DMP_INT_STATUS => "DMP_INT_STATUS",
        INT_STATUS => "INT_STATUS",
        ACCEL_XOUT_H => "ACCEL_XOUT_H",
        ACCEL_XOUT_L => "ACCEL_XOUT_L",
        ACCEL_YOUT_H => "ACCEL_YOUT_H",
        ACCEL_YOUT_L => "ACCEL_YOUT_L",
        ACCEL_ZOUT_H => "ACCEL_ZOUT_H",
        ACCEL_ZOUT_L => "ACCEL_ZOUT_L",
        TEMP_OUT_H => "TEMP_OUT_H",
        TEMP_OUT_L => "TEMP_OUT_L",
        GYRO_XOUT_H => "GYRO_XOUT_H",
        GYRO_XOUT_L => "GYRO_XOUT_L",
        GYRO_YOUT_H => "GYRO_YOUT_H",
        GYRO_YOUT_L => "GYRO_YOUT_L",
        GYRO_ZOUT_H => "GYRO_ZOUT_H",
        GYRO_ZOUT_L => "GYRO_ZOUT_L",
        0x49 => "EXT_SENS_DATA_00",
        0x4A => "EXT_SENS_DATA_01",
        0x4B => "EXT_SENS_DATA_02",
        0x4C => "EXT_SENS_DATA_03",
        0x4D => "EXT_SENS_DATA_04",
        0x4E => "EXT_SENS_DATA_05",
        0x4F => "EXT_SENS_DATA_06",
        0x50 => "EXT_SENS_DATA_07",
        0x51 => "EXT_SENS_DATA_08",
        0x52 => "EXT_SENS_DATA_09",
        0x53 => "EXT_SENS_DATA_10",
        0x54 => "EXT_SENS_DATA_11",
        0x55 => "EXT_SENS_DATA_12",
        0x56 => "EXT_SENS_DATA_13",
        0x57 => "EXT_SENS_DATA_14",
        0x58 => "EXT_SENS_DATA_15",
        0x59 => "EXT_SENS_DATA_16",
        0x5A => "EXT_SENS_DATA_17",
        0x5B => "EXT_SENS_DATA_18",
        0x5C => "EXT_SENS_DATA_19",
        0x5D => "EXT_SENS_DATA_20",
        0x5E => "EXT_SENS_DATA_21",
        0x5F => "EXT_SENS_DATA_22",
        0x60 => "EXT_SENS_DATA_23",
        MOT_DETECT_STATUS => "MOT_DETECT_STATUS",
        I2C_SLV0_DO => "I2C_SLV0_DO",
        I2C_SLV1_DO => "I2C_SLV1_DO",
        I2C_SLV2_DO => "I2C_SLV2_DO",
        I2C_SLV3_DO => "I2C_SLV3_DO",
        I2C_MST_DELAY_CTRL => "I2C_MST_DELAY_CTRL",
        SIGNAL_PATH_RESET => "SIGNAL_PATH_RESET",
        MOT_DETECT_CTRL => "MOT_DETECT_CTRL",
        USER_CTRL => "USER_CTRL",
        PWR_MGMT_1 => "PWR_MGMT_1",
        PWR_MGMT_2 => "PWR_MGMT_2",
        BANK_SEL => "BANK_SEL",
        MEM_START_ADDR => "MEM_START_ADDR",
        MEM_R_W => "MEM_R_W",
        PRGM_START_H => "PRGM_START_H",
        PRGM_START_L => "PRGM_START_L",
        FIFO_COUNT_H => "FIFO_COUNT_H",
        FIFO_COUNT_L => "FIFO_COUNT_L",
        FIFO_R_W => "FIFO_R_W",
        WHO_AM_I => "WHO_AM_I",
        _ => "",
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
